use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::services::GcHandle;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping background tasks...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 停止垃圾回收任务；正在执行的清理最多等待 SHUTDOWN_TIMEOUT_SECS 秒
pub async fn stop_background_tasks(gc: GcHandle) {
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), gc.shutdown()).await {
        Ok(()) => {
            info!("All shutdown tasks completed successfully");
        }
        Err(_) => {
            error!(
                "Garbage collector did not stop within {} seconds, abandoning it",
                SHUTDOWN_TIMEOUT_SECS
            );
        }
    }
}
