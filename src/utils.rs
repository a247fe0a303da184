use anyhow::Result;
use chrono::{DateTime, NaiveDate, Timelike, Utc};

/// Parses an ISO 8601 calendar date such as `2019-01-30`. The date pickers
/// sometimes send a full timestamp (`2019-01-30T00:00:00`), only the date part
/// is kept.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    let date_part = date.split('T').next().unwrap_or(date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date `{date}`: {e}"))
}

/// Treats empty and whitespace-only strings the same as absent ones.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn datetime_of_epoch_ms(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}

// Fractional seconds are only shown when present, so whole-second pings stay
// short in the map tooltip.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    if datetime.nanosecond() == 0 {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}
