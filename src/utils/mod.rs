pub mod time;

pub use time::{add_days, days_between, format_interval};
