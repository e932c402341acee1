//! 启动时的配置校验
//!
//! 所有问题一次性收集后报告。

use super::StaticConfig;
use crate::errors::{Result, ShortpathError};
use crate::utils::url_validator::normalize_base_url;

/// short 列的长度上限
pub const MAX_SHORT_LENGTH_LIMIT: i64 = 255;

const LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &mut StaticConfig) -> Result<()> {
    let mut problems = Vec::new();
    let links = &config.links;

    if links.cleanup_interval_minutes <= 0 {
        problems.push("links.cleanup_interval_minutes must be greater than 0".to_string());
    }
    if links.max_short_length <= 0 || links.max_short_length > MAX_SHORT_LENGTH_LIMIT {
        problems.push(format!(
            "links.max_short_length must be between 1 and {}",
            MAX_SHORT_LENGTH_LIMIT
        ));
    }
    if links.default_short_length <= 0 || links.default_short_length > links.max_short_length {
        problems.push(
            "links.default_short_length must be greater than 0 and not exceed max_short_length"
                .to_string(),
        );
    }
    if links.max_custom_length <= 0 || links.max_custom_length > links.max_short_length {
        problems.push(
            "links.max_custom_length must be greater than 0 and not exceed max_short_length"
                .to_string(),
        );
    }
    if links.default_expiry_minutes < 0 {
        problems.push("links.default_expiry_minutes must not be negative".to_string());
    }

    match normalize_base_url(&config.instance.url) {
        Ok(url) => config.instance.url = url,
        Err(e) => problems.push(format!("instance.url is invalid: {}", e)),
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        problems.push(format!(
            "logging.format must be one of {:?}, got '{}'",
            LOG_FORMATS, config.logging.format
        ));
    }
    if config.database.database_url.trim().is_empty() {
        problems.push("database.database_url must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ShortpathError::config(problems.join("; ")))
    }
}
