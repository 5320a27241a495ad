use chrono::{DateTime, Utc};

/// Source of the current instant; trending dates and cache ages are all derived from it
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `YYYY-MM-DD` in UTC
pub fn iso_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `YYYYMMDD` in UTC, the seed for the daily selection
pub fn date_seed(at: DateTime<Utc>) -> String {
    iso_date(at).replace('-', "")
}
