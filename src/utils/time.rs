use chrono::{DateTime, Duration, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days from `from` to `to`, negative when `to` is earlier
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}

pub fn add_days(at: DateTime<Utc>, days: i32) -> DateTime<Utc> {
    at + Duration::days(days as i64)
}

/// Format an interval in days to a compact string
pub fn format_interval(days: i32) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
