//! Server mode
//!
//! Starts the HTTP server and the garbage collector, then waits for either
//! the server to stop or a shutdown signal.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::configure_routes;
use crate::api::services::AppStartTime;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// worker 数量上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    // web::Data 内部是 Arc，所有 worker 共享同一份
    let link_service = web::Data::from(startup.link_service.clone());
    let resolver = web::Data::from(startup.resolver.clone());
    let instance = web::Data::new(startup.instance.clone());
    let start_time = web::Data::new(app_start_time);

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(link_service.clone())
            .app_data(resolver.clone())
            .app_data(instance.clone())
            .app_data(start_time.clone())
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(configure_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    let gc = startup.garbage_collector.spawn();

    // Wait for server or shutdown signal
    let outcome = tokio::select! {
        res = server => res.context("HTTP server stopped with an error"),
        _ = lifetime::shutdown::listen_for_shutdown() => {
            info!("Graceful shutdown requested");
            Ok(())
        }
    };

    lifetime::shutdown::stop_background_tasks(gc).await;
    outcome
}
