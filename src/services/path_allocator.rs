//! Short path allocation
//!
//! A custom path is validated, truncated and inserted once. A generated path
//! starts at the requested length and grows by one character per collision
//! until `max_length`; running out of lengths is `Exhausted`.

use std::fmt;

use tracing::{debug, warn};

use crate::config::LinksConfig;
use crate::errors::ShortpathError;
use crate::storage::{Link, LinkStore, StoreError};
use crate::utils::{first_non_alphanumeric, generate_random_code};

/// 前端与调试使用的路径
pub const RESERVED_PATHS: &[&str] = &["status", "error", "add", "access", "privacy"];
/// 以此开头的路径全部保留（静态资源）
pub const RESERVED_PREFIX: &str = "assets";

pub fn is_reserved(path: &str) -> bool {
    RESERVED_PATHS.contains(&path) || path.starts_with(RESERVED_PREFIX)
}

/// 已校验的路径请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRequest {
    Custom(String),
    Generated { length: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub short: String,
    /// 生成的路径长度与请求长度不同
    pub length_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// 所有长度都发生冲突
    Exhausted,
    /// 自定义路径已被占用
    Conflict(String),
    Store(StoreError),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "No more space left in the database."),
            Self::Conflict(short) => write!(f, "The path '/{}' is already in use.", short),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AllocationError {}

impl From<AllocationError> for ShortpathError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Exhausted => ShortpathError::exhausted(err.to_string()),
            AllocationError::Conflict(_) => ShortpathError::conflict(err.to_string()),
            AllocationError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAllocator {
    default_length: usize,
    max_length: usize,
    max_custom_length: usize,
}

impl PathAllocator {
    pub fn new(default_length: usize, max_length: usize, max_custom_length: usize) -> Self {
        Self {
            default_length,
            max_length,
            max_custom_length,
        }
    }

    /// 配置已在启动时校验为正数
    pub fn from_config(config: &LinksConfig) -> Self {
        let to_len = |v: i64| usize::try_from(v.max(1)).unwrap_or(1);
        Self::new(
            to_len(config.default_short_length),
            to_len(config.max_short_length),
            to_len(config.max_custom_length),
        )
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// `<= 0` 使用默认长度，超过上限时截到上限
    pub fn clamp_length(&self, requested: i64) -> usize {
        if requested <= 0 {
            self.default_length
        } else {
            usize::try_from(requested)
                .map_or(self.max_length, |len| len.min(self.max_length))
        }
    }

    /// 校验自定义路径：保留路径和非字母数字字符都会被拒绝，超长部分静默截断
    pub fn custom_request(&self, raw: &str) -> Result<PathRequest, ShortpathError> {
        if is_reserved(raw) {
            return Err(ShortpathError::validation(format!(
                "The path '/{}' is reserved.",
                raw
            )));
        }
        if let Some(c) = first_non_alphanumeric(raw) {
            return Err(ShortpathError::validation(format!(
                "The character '{}' is not allowed.",
                c
            )));
        }

        // 只剩 ASCII，按字节截断即按字符截断
        let truncated = &raw[..raw.len().min(self.max_custom_length)];
        if truncated.len() != raw.len() && is_reserved(truncated) {
            return Err(ShortpathError::validation(format!(
                "The path '/{}' is reserved.",
                truncated
            )));
        }
        Ok(PathRequest::Custom(truncated.to_string()))
    }

    pub fn generated_request(&self, requested_length: i64) -> PathRequest {
        PathRequest::Generated {
            length: self.clamp_length(requested_length),
        }
    }

    /// 插入 `template`（short 字段会被覆盖），成功时恰好写入一条记录
    pub async fn allocate(
        &self,
        store: &dyn LinkStore,
        template: &Link,
        request: &PathRequest,
    ) -> Result<Allocation, AllocationError> {
        match request {
            PathRequest::Custom(short) => {
                let link = Link {
                    short: short.clone(),
                    ..template.clone()
                };
                match store.create_link(&link).await {
                    Ok(()) => Ok(Allocation {
                        short: short.clone(),
                        length_changed: false,
                    }),
                    Err(StoreError::UniqueViolation(_)) => {
                        Err(AllocationError::Conflict(short.clone()))
                    }
                    Err(e) => Err(AllocationError::Store(e)),
                }
            }
            PathRequest::Generated { length } => {
                self.allocate_generated(store, template, *length).await
            }
        }
    }

    async fn allocate_generated(
        &self,
        store: &dyn LinkStore,
        template: &Link,
        requested: usize,
    ) -> Result<Allocation, AllocationError> {
        let first = requested.clamp(1, self.max_length);

        for length in first..=self.max_length {
            let link = Link {
                short: generate_random_code(length),
                ..template.clone()
            };

            match store.create_link(&link).await {
                Ok(()) => {
                    if length != requested {
                        debug!(
                            "Generated path '{}' needed length {} instead of {}",
                            link.short, length, requested
                        );
                    }
                    return Ok(Allocation {
                        short: link.short,
                        length_changed: length != requested,
                    });
                }
                Err(StoreError::UniqueViolation(short)) => {
                    debug!("Generated path '{}' collided at length {}", short, length);
                }
                Err(e) => return Err(AllocationError::Store(e)),
            }
        }

        warn!(
            "Path space exhausted: every length from {} to {} collided",
            first, self.max_length
        );
        Err(AllocationError::Exhausted)
    }
}
