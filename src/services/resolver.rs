//! Link resolution
//!
//! Decides between redirect, metadata disclosure and password challenge for
//! a single request.

use std::sync::Arc;

use tracing::{debug, error};

use crate::errors::{Result, ShortpathError};
use crate::storage::{LinkInfo, LinkStore};
use crate::utils::password::verify_password_blocking;

/// 追加在 short 末尾，表示查询链接信息而不跳转
pub const INFO_MARKER: char = '+';

const NOT_FOUND_MESSAGE: &str =
    "There is no link associated with this path, it is probably invalid or expired.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect { url: String },
    Info(LinkInfo),
    /// 链接受密码保护，但请求中没有密码
    Challenge { short: String },
}

/// 去掉一次信息标记，返回 (short, 是否为信息请求)
pub fn split_info_marker(raw: &str) -> (&str, bool) {
    match raw.strip_suffix(INFO_MARKER) {
        Some(short) => (short, true),
        None => (raw, false),
    }
}

/// 依次取 JSON 负载中的密码和参数中的密码，空字符串视为未提供
pub fn pick_password(payload: Option<String>, param: Option<String>) -> Option<String> {
    payload
        .filter(|p| !p.is_empty())
        .or_else(|| param.filter(|p| !p.is_empty()))
}

#[derive(Clone)]
pub struct LinkResolver {
    store: Arc<dyn LinkStore>,
}

impl LinkResolver {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, raw_short: &str, password: Option<String>) -> Result<Resolution> {
        let (short, info_request) = split_info_marker(raw_short);

        let hash = self
            .store
            .get_hash_by_short(short)
            .await?
            .ok_or_else(|| ShortpathError::not_found(NOT_FOUND_MESSAGE))?;

        if !hash.is_empty() {
            let Some(candidate) = password.filter(|p| !p.is_empty()) else {
                debug!("Link '{}' is protected, asking for a password", short);
                return Ok(Resolution::Challenge {
                    short: short.to_string(),
                });
            };

            let matches = verify_password_blocking(candidate, hash).await.map_err(|e| {
                error!("Cannot verify password for '{}': {}", short, e);
                ShortpathError::from(e)
            })?;
            if !matches {
                return Err(ShortpathError::auth_failure("The password is incorrect."));
            }
        }

        // 校验与读取之间链接可能已被回收
        if info_request {
            let info = self
                .store
                .get_link_info(short)
                .await?
                .ok_or_else(|| ShortpathError::not_found(NOT_FOUND_MESSAGE))?;
            Ok(Resolution::Info(info))
        } else {
            let url = self
                .store
                .get_url_by_short(short)
                .await?
                .ok_or_else(|| ShortpathError::not_found(NOT_FOUND_MESSAGE))?;
            Ok(Resolution::Redirect { url })
        }
    }
}
