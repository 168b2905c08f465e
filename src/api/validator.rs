// ==========================================
// 八字运势引擎 - 输入校验器
// ==========================================
// 职责: 把请求层的字符串输入解析为引擎值类型
// 红线: 引擎只接收已校验的值，所有解析失败在此处转为 ApiError::InvalidInput
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Gender;
use crate::engine::date_picker::{Purpose, WeekendPolicy};
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::ops::RangeInclusive;
use tracing::warn;

/// 支持的公历年份范围（出生与目标日期）
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=2100;

/// 未提供出生时间时使用正午
pub const DEFAULT_BIRTH_TIME: &str = "12:00";

/// 解析 YYYY-MM-DD
pub fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::invalid_input(format!("{}格式错误 '{}': {}", field, value, e)))?;
    validate_year(field, date)?;
    Ok(date)
}

/// 解析 HH:MM 或 HH:MM:SS
pub fn parse_time(value: &str) -> ApiResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| ApiError::invalid_input(format!("出生时间格式错误 '{}': {}", value, e)))
}

/// 经度必须是有限数值；越界值交由引擎回退到参考经线
pub fn parse_longitude(value: &str) -> ApiResult<f64> {
    let lon: f64 = value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_input(format!("经度格式错误: {}", value)))?;
    if !lon.is_finite() {
        return Err(ApiError::invalid_input(format!("经度必须为有限数值: {}", value)));
    }
    Ok(lon)
}

pub fn parse_gender(value: &str) -> ApiResult<Gender> {
    value.parse().map_err(ApiError::InvalidInput)
}

/// 未知场景按 other 处理
pub fn parse_purpose(value: &str) -> Purpose {
    value.parse().unwrap_or_else(|e: String| {
        warn!(error = %e, "未知择日场景，按 other 处理");
        Purpose::Other
    })
}

pub fn parse_weekend_policy(value: &str) -> ApiResult<WeekendPolicy> {
    value.parse().map_err(ApiError::InvalidInput)
}

/// 日期须落在支持的年份范围内
pub fn validate_year(field: &str, date: NaiveDate) -> ApiResult<()> {
    if SUPPORTED_YEARS.contains(&date.year()) {
        Ok(())
    } else {
        Err(ApiError::invalid_input(format!(
            "{}超出支持范围 {}..={}: {}",
            field,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end(),
            date
        )))
    }
}
