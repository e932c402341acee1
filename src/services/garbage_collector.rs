//! Periodic removal of expired links
//!
//! One task per process. Sweep errors are logged and never leave the task.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::storage::{LinkStore, StoreResult};

#[derive(Clone)]
pub struct GarbageCollector {
    store: Arc<dyn LinkStore>,
    interval: StdDuration,
}

/// 运行中的回收任务
pub struct GcHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl GcHandle {
    /// 通知任务退出并等待结束
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!("Garbage collector task ended abnormally: {}", e);
        }
    }
}

impl GarbageCollector {
    pub fn new(store: Arc<dyn LinkStore>, interval: StdDuration) -> Self {
        Self { store, interval }
    }

    pub fn from_minutes(store: Arc<dyn LinkStore>, minutes: i64) -> Self {
        let minutes = u64::try_from(minutes.max(1)).unwrap_or(1);
        Self::new(store, StdDuration::from_secs(minutes * 60))
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let deleted = self.store.delete_expired(now).await?;
        if deleted > 0 {
            info!("Garbage collector removed {} expired links", deleted);
        } else {
            debug!("Garbage collector found no expired links");
        }
        Ok(deleted)
    }

    /// 立即执行一次清理
    pub async fn sweep_once(&self) -> StoreResult<u64> {
        self.sweep_at(Utc::now()).await
    }

    /// 启动后台任务；第一次清理立即执行，错过的周期直接跳过
    pub fn spawn(self) -> GcHandle {
        let (stop, mut stopped) = watch::channel(false);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_once().await {
                            error!("Garbage collection failed: {}", e);
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Garbage collector stopped");
        });

        info!(
            "Garbage collector started (interval: {}s)",
            period.as_secs()
        );
        GcHandle { stop, task }
    }
}
