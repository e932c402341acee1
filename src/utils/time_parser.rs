use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// 显式过期时间的输入格式（按 UTC 解释）
pub const EXPLICIT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct TimeParser;

impl TimeParser {
    /// 解析显式过期时间
    ///
    /// 接受 `YYYY-MM-DDTHH:MM`（UTC），也接受完整的 RFC3339
    pub fn parse_explicit_date(input: &str) -> Result<DateTime<Utc>, String> {
        let input = input.trim();

        if let Ok(naive) = NaiveDateTime::parse_from_str(input, EXPLICIT_DATE_FORMAT) {
            return Ok(naive.and_utc());
        }

        DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                format!(
                    "Invalid expiration date '{}', expected YYYY-MM-DDTHH:MM",
                    input
                )
            })
    }

    /// 解析相对时长：1d, 2w, 3M, 1y, 1h30m, 1d2h3m4s
    ///
    /// `M` 表示月（30 天），`m` 表示分钟
    pub fn parse_duration(input: &str) -> Result<Duration, String> {
        let input = input.trim();
        let mut total = Duration::zero();
        let mut remaining = input;

        if remaining.is_empty() {
            return Err("Duration cannot be empty".to_string());
        }

        while !remaining.is_empty() {
            let digits_end = remaining
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(remaining.len());
            let (num_str, rest) = remaining.split_at(digits_end);
            if num_str.is_empty() {
                return Err(format!("Invalid duration format: '{}'", input));
            }
            let num: i64 = num_str
                .parse()
                .map_err(|_| format!("Invalid number: '{}'", num_str))?;

            let unit_end = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            let (unit, rest) = rest.split_at(unit_end);
            if unit.is_empty() {
                return Err(format!("Missing time unit after '{}'", num));
            }

            total = total
                .checked_add(&Self::unit_duration(num, unit)?)
                .ok_or_else(|| "Duration is out of range".to_string())?;
            remaining = rest;
        }

        if total == Duration::zero() {
            return Err("Duration cannot be zero".to_string());
        }
        Ok(total)
    }

    fn unit_duration(num: i64, unit: &str) -> Result<Duration, String> {
        let out_of_range = || "Duration is out of range".to_string();
        let in_days = |factor: i64| num.checked_mul(factor).and_then(Duration::try_days);

        // 月份区分大小写（M），其余单位不区分
        let duration = if unit == "M" {
            in_days(30)
        } else {
            match unit.to_lowercase().as_str() {
                "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
                "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
                "h" | "hour" | "hours" => Duration::try_hours(num),
                "d" | "day" | "days" => Duration::try_days(num),
                "w" | "week" | "weeks" => Duration::try_weeks(num),
                "month" | "months" => in_days(30),
                "y" | "year" | "years" => in_days(365),
                _ => return Err(format!("Unsupported time unit: '{}'", unit)),
            }
        };
        duration.ok_or_else(out_of_range)
    }
}
