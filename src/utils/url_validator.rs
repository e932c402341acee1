//! URL 验证模块
//!
//! 目标地址必须是 http(s)，有非空主机名，并且协议之后至少出现一个 "."

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    MissingDomain,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::MissingDomain => write!(f, "URL must contain a domain"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 去掉协议前缀，返回剩余部分；不是 http(s) 时返回 None
fn strip_http_scheme(url: &str) -> Option<&str> {
    ["http://", "https://"].iter().find_map(|scheme| {
        url.get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .map(|_| &url[scheme.len()..])
    })
}

pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let Some(rest) = strip_http_scheme(url) else {
        let proto = url
            .split(':')
            .next()
            .map(|s| format!("{}:", s.to_lowercase()))
            .unwrap_or_default();
        return Err(UrlValidationError::InvalidProtocol(proto));
    };

    // Url::parse 会静默丢弃 TAB/CR/LF，原串却会写进 Location 头
    if url.chars().any(|c| c.is_ascii_control()) {
        return Err(UrlValidationError::InvalidFormat(
            "URL must not contain control characters".to_string(),
        ));
    }

    if !rest.contains('.') {
        return Err(UrlValidationError::MissingDomain);
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingDomain),
    }
}

/// 校验实例公开地址并保证以 "/" 结尾
pub fn normalize_base_url(url: &str) -> Result<String, UrlValidationError> {
    validate_url(url)?;
    let url = url.trim();
    if url.ends_with('/') {
        Ok(url.to_string())
    } else {
        Ok(format!("{}/", url))
    }
}
