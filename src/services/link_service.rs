//! Link management service
//!
//! Provides the creation pipeline shared by the HTTP handlers and the CLI:
//! expiry selection, path allocation, password hashing and insert.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::expiry::ExpiryPolicy;
use super::path_allocator::{PathAllocator, PathRequest};
use crate::config::LinksConfig;
use crate::errors::{Result, ShortpathError};
use crate::storage::{Link, LinkStore};
use crate::utils::password::hash_password_blocking;
use crate::utils::url_validator::validate_url;

/// 过期时间输入的两种形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryInput {
    /// JSON API：显式日期和相对时长
    Fields {
        expire_date: Option<String>,
        expire_after: Option<String>,
    },
    /// 表单：分钟数，-1 永不过期
    Minutes(i64),
}

impl Default for ExpiryInput {
    fn default() -> Self {
        Self::Fields {
            expire_date: None,
            expire_after: None,
        }
    }
}

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub url: String,
    /// 自定义路径，空表示自动生成
    pub custom_path: Option<String>,
    /// 生成路径的期望长度，<= 0 使用默认值
    pub length: i64,
    pub expiry: ExpiryInput,
    pub password: Option<String>,
}

/// Result of link creation
#[derive(Debug, Clone)]
pub struct LinkCreateResult {
    pub link: Link,
    /// 生成路径因空间不足改变了长度
    pub length_changed: bool,
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    allocator: PathAllocator,
    default_expiry_minutes: i64,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, config: &LinksConfig) -> Self {
        Self {
            store,
            allocator: PathAllocator::from_config(config),
            default_expiry_minutes: config.default_expiry_minutes,
        }
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<LinkCreateResult> {
        let url = req.url.trim().to_string();
        validate_url(&url).map_err(|_| ShortpathError::validation("The URL is invalid."))?;

        let now = Utc::now();
        let policy = match &req.expiry {
            ExpiryInput::Fields {
                expire_date,
                expire_after,
            } => ExpiryPolicy::select(
                expire_date.as_deref(),
                expire_after.as_deref(),
                self.default_expiry_minutes,
                now,
            )?,
            ExpiryInput::Minutes(minutes) => {
                ExpiryPolicy::from_minutes(*minutes, self.default_expiry_minutes)
            }
        };

        let path_request = match req.custom_path.as_deref().filter(|p| !p.is_empty()) {
            Some(custom) => self.allocator.custom_request(custom)?,
            // 永不过期的链接使用最大长度
            None if policy.is_never() => PathRequest::Generated {
                length: self.allocator.max_length(),
            },
            None => self.allocator.generated_request(req.length),
        };

        let password_hash = hash_password_blocking(req.password).await.map_err(|e| {
            error!("Failed to hash password: {}", e);
            ShortpathError::internal("Could not hash the password.")
        })?;

        let template = Link {
            id: Uuid::new_v4(),
            created_at: now,
            expire_at: policy.expire_at(now),
            url,
            short: String::new(),
            password_hash,
        };

        let allocation = self
            .allocator
            .allocate(self.store.as_ref(), &template, &path_request)
            .await?;

        let link = Link {
            short: allocation.short,
            ..template
        };
        info!(
            "LinkService: created link '{}' -> '{}' (expires {})",
            link.short, link.url, link.expire_at
        );

        Ok(LinkCreateResult {
            link,
            length_changed: allocation.length_changed,
        })
    }

    /// 显式删除链接
    pub async fn remove_link(&self, short: &str) -> Result<()> {
        if self.store.delete_by_short(short).await? {
            info!("LinkService: removed link '{}'", short);
            Ok(())
        } else {
            Err(ShortpathError::not_found(format!(
                "No link is associated with the path '/{}'.",
                short
            )))
        }
    }
}
