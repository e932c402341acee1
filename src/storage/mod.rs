//! Link persistence
//!
//! The engine only talks to [`LinkStore`]. Uniqueness of `short` is the
//! store's job: `create_link` must be an atomic check-and-insert and must
//! report a duplicate as [`StoreError::UniqueViolation`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStore;
pub use models::{Link, LinkInfo, never_expires};

/// 存储层错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// short 已被占用（唯一约束冲突）
    UniqueViolation(String),
    Connection(String),
    Operation(String),
    /// 存储中的数据无法解析
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniqueViolation(short) => write!(f, "short '{}' already exists", short),
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::Operation(msg) => write!(f, "operation failed: {}", msg),
            Self::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// 插入新链接；short 冲突时返回 `StoreError::UniqueViolation`，且不留下任何记录
    async fn create_link(&self, link: &Link) -> StoreResult<()>;

    async fn get_url_by_short(&self, short: &str) -> StoreResult<Option<String>>;

    async fn get_hash_by_short(&self, short: &str) -> StoreResult<Option<String>>;

    async fn get_link_info(&self, short: &str) -> StoreResult<Option<LinkInfo>>;

    /// 删除所有 `expire_at <= now` 的链接，返回删除数量
    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// 显式删除，返回链接是否存在
    async fn delete_by_short(&self, short: &str) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<u64>;

    fn backend_name(&self) -> &str;
}

/// 数据库 URL 为该值时使用纯内存存储
pub const MEMORY_DATABASE_URL: &str = "memory://";

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StaticConfig) -> Result<Arc<dyn LinkStore>> {
        let database_url = &config.database.database_url;

        if database_url == MEMORY_DATABASE_URL {
            tracing::warn!("Using in-memory link store, links will not survive a restart");
            return Ok(Arc::new(MemoryStore::new()));
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(&config.database, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
