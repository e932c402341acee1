//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortpathError};
use crate::storage::{LinkInfo, LinkStore, StoreError, StoreResult};
use crate::storage::models::Link;

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{link_to_active_model, model_to_link};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ShortpathError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 将 DbErr 映射为存储层错误，唯一约束冲突单独识别
pub(crate) fn map_db_err(err: DbErr, short: &str) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return StoreError::UniqueViolation(short.to_string());
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Connection(err.to_string()),
        other => StoreError::Operation(other.to_string()),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(ShortpathError::database_config("database_url is not set"));
        }

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn create_link(&self, link: &Link) -> StoreResult<()> {
        self.insert_link(link).await
    }

    async fn get_url_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.find_url(short).await
    }

    async fn get_hash_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.find_password_hash(short).await
    }

    async fn get_link_info(&self, short: &str) -> StoreResult<Option<LinkInfo>> {
        self.find_link(short).await.map(|link| link.map(|l| l.info()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.delete_expired_before(now).await
    }

    async fn delete_by_short(&self, short: &str) -> StoreResult<bool> {
        self.delete_short(short).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.count_links().await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
