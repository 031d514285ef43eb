use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" and of the local time zone used for calendar-day
/// bucketing.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date of `at`, using the UTC offset in effect at that
    /// instant rather than the one in effect now.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

#[cfg(test)]
pub use fixed::{FixedClock, TestZone};
