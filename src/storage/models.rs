use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// "永不过期" 哨兵时间的 Unix 时间戳（9999-12-31T23:59:59Z）
const NEVER_EXPIRES_TIMESTAMP: i64 = 253_402_300_799;

/// 返回 "永不过期" 的哨兵时间
pub fn never_expires() -> DateTime<Utc> {
    DateTime::from_timestamp(NEVER_EXPIRES_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
    pub url: String,
    pub short: String,
    /// 空字符串表示不需要密码
    #[serde(default)]
    pub password_hash: String,
}

impl Link {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }

    pub fn is_protected(&self) -> bool {
        !self.password_hash.is_empty()
    }

    pub fn never_expires(&self) -> bool {
        self.expire_at >= never_expires()
    }

    pub fn info(&self) -> LinkInfo {
        LinkInfo {
            url: self.url.clone(),
            short: self.short.clone(),
            created_at: self.created_at,
            expire_at: self.expire_at,
        }
    }
}

/// 可以公开的链接元数据（不含密码哈希）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    #[serde(rename = "dstUrl")]
    pub url: String,
    pub short: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expire_at: DateTime<Utc>,
}
