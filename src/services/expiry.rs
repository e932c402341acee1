//! Expiration time selection
//!
//! Inputs are folded into an [`ExpiryPolicy`] by [`ExpiryPolicy::select`],
//! highest priority first: explicit date, relative duration, instance default,
//! never.

use chrono::{DateTime, Duration, Utc};

use crate::errors::ShortpathError;
use crate::storage::never_expires;
use crate::utils::time_parser::TimeParser;

/// 前端表单中表示 "永不过期" 的分钟数
pub const NEVER_MINUTES: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    Explicit(DateTime<Utc>),
    Relative(Duration),
    /// 实例默认分钟数（非零）
    Default(i64),
    Never,
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

impl ExpiryPolicy {
    /// 按优先级选择过期策略；显式日期或相对时长解析失败都是请求错误
    pub fn select(
        explicit_date: Option<&str>,
        relative: Option<&str>,
        default_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, ShortpathError> {
        if let Some(date) = non_empty(explicit_date) {
            let at = TimeParser::parse_explicit_date(date).map_err(ShortpathError::validation)?;
            if at <= now {
                return Err(ShortpathError::validation(
                    "The expiration date is in the past; pick a future date or use a relative expiry.",
                ));
            }
            return Ok(Self::Explicit(at));
        }

        if let Some(expr) = non_empty(relative) {
            let duration = TimeParser::parse_duration(expr).map_err(ShortpathError::validation)?;
            if duration < Duration::zero() {
                return Err(ShortpathError::validation(
                    "The expiration duration must be positive.",
                ));
            }
            return Ok(Self::Relative(duration));
        }

        Ok(Self::from_default(default_minutes))
    }

    /// 表单中的分钟数：-1 永不过期，<= 0 使用默认值，> 0 为相对分钟
    pub fn from_minutes(expire_after: i64, default_minutes: i64) -> Self {
        match expire_after {
            NEVER_MINUTES => Self::Never,
            m if m <= 0 => Self::from_default(default_minutes),
            m => Duration::try_minutes(m).map_or(Self::Never, Self::Relative),
        }
    }

    fn from_default(default_minutes: i64) -> Self {
        if default_minutes == 0 {
            Self::Never
        } else {
            Self::Default(default_minutes)
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// 计算绝对过期时间，溢出时视为永不过期
    pub fn expire_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = match self {
            Self::Explicit(at) => return (*at).min(never_expires()),
            Self::Never => return never_expires(),
            Self::Relative(duration) => Some(*duration),
            Self::Default(minutes) => Duration::try_minutes(*minutes),
        };

        offset
            .and_then(|d| now.checked_add_signed(d))
            .map_or_else(never_expires, |at| at.min(never_expires()))
    }
}
