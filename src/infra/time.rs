use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// `2024-05-01 13:45:09` in the given zone; used in file captions.
pub fn format_caption_time(ms: i64, zone: &Tz) -> String {
    let dt_utc: DateTime<Utc> = Utc
        .timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH);
    dt_utc.with_timezone(zone).format("%Y-%m-%d %H:%M:%S").to_string()
}
