use chrono::{NaiveDateTime, Utc};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait TimeProvider : Send + Sync {
    fn naive_utc_now(&self) -> NaiveDateTime;
}

#[derive(Default)]
pub struct CoreTimeProvider;
impl CoreTimeProvider {
    pub fn new() -> Self {
        Self
    }
}
impl TimeProvider for CoreTimeProvider {
    fn naive_utc_now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

///
/// Hours elapsed between `last_checked` and `now`, with sub-hour precision.
/// Negative when `last_checked` lies in the future.
///
pub fn elapsed_hours(last_checked: NaiveDateTime, now: NaiveDateTime) -> f64 {
    (now - last_checked).num_milliseconds() as f64 / (1000.0 * 3600.0)
}
