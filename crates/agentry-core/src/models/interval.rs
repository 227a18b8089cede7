//! Calendar-aware run interval.

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;
// Flattening treats a month as 30 days and a year as 365 days. The
// approximation is part of the persistence format and must not change.
const SECONDS_PER_MONTH: i64 = 2_592_000;
const SECONDS_PER_YEAR: i64 = 31_536_000;

/// Duration between agent runs, kept in calendar units.
///
/// Persistence flattens the interval to whole seconds, so anything
/// expressed in calendar units loses its calendar shape on a round trip
/// through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarInterval {
    /// Seconds-only interval, as reconstructed from the store.
    pub const fn from_seconds(seconds: u32) -> Self {
        Self {
            years: 0,
            months: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds,
        }
    }

    /// Flatten to seconds using the fixed persistence weights.
    pub fn total_seconds(&self) -> i64 {
        i64::from(self.seconds)
            + i64::from(self.minutes) * SECONDS_PER_MINUTE
            + i64::from(self.hours) * SECONDS_PER_HOUR
            + i64::from(self.days) * SECONDS_PER_DAY
            + i64::from(self.months) * SECONDS_PER_MONTH
            + i64::from(self.years) * SECONDS_PER_YEAR
    }
}
