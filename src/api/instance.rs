use serde::Serialize;

use crate::config::StaticConfig;

/// 实例的只读信息，构造后通过 `web::Data` 注入处理函数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceContext {
    pub name: String,
    /// 以 "/" 结尾
    pub url: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub default_short_length: i64,
    pub max_short_length: i64,
    pub max_custom_length: i64,
    pub default_expiry_minutes: i64,
}

impl InstanceContext {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            name: config.instance.name.clone(),
            url: config.instance.url.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_email: config.instance.contact_email.clone(),
            default_short_length: config.links.default_short_length,
            max_short_length: config.links.max_short_length,
            max_custom_length: config.links.max_custom_length,
            default_expiry_minutes: config.links.default_expiry_minutes,
        }
    }

    /// 完整的短链接地址
    pub fn shortened_link(&self, short: &str) -> String {
        format!("{}{}", self.url, short)
    }
}
