use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::InstanceContext;
use crate::config::StaticConfig;
use crate::services::{GarbageCollector, LinkResolver, LinkService};
use crate::storage::StorageFactory;

/// 服务器运行所需的共享组件
pub struct StartupContext {
    pub link_service: Arc<LinkService>,
    pub resolver: Arc<LinkResolver>,
    pub instance: InstanceContext,
    pub garbage_collector: GarbageCollector,
}

/// CLI 模式只需要存储和链接服务
pub async fn prepare_cli_startup(config: &StaticConfig) -> Result<Arc<LinkService>> {
    install_crypto_provider()?;

    let store = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    Ok(Arc::new(LinkService::new(store, &config.links)))
}

/// 准备服务器启动的上下文
/// 包括存储、链接服务、解析器和垃圾回收器
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider()?;

    let store = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", store.backend_name());

    let link_service = Arc::new(LinkService::new(store.clone(), &config.links));
    let resolver = Arc::new(LinkResolver::new(store.clone()));
    let instance = InstanceContext::from_config(config);
    let garbage_collector =
        GarbageCollector::from_minutes(store.clone(), config.links.cleanup_interval_minutes);

    info!(
        "Instance '{}' will hand out links under {}",
        instance.name, instance.url
    );
    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        link_service,
        resolver,
        instance,
        garbage_collector,
    })
}

/// PostgreSQL / MySQL 的 TLS 连接需要进程级的 rustls provider
fn install_crypto_provider() -> Result<()> {
    // 重复调用时沿用已安装的 provider
    if rustls::crypto::CryptoProvider::get_default().is_some() {
        return Ok(());
    }
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))
}
