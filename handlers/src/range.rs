use crate::errors::Error;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

/// Predefined lookback windows accepted by the query handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    LastHour,
    Last6Hours,
    Last12Hours,
    #[default]
    LastDay,
    LastWeek,
    LastMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::LastHour,
        TimeRange::Last6Hours,
        TimeRange::Last12Hours,
        TimeRange::LastDay,
        TimeRange::LastWeek,
        TimeRange::LastMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::LastHour => "last_hour",
            TimeRange::Last6Hours => "last_6_hours",
            TimeRange::Last12Hours => "last_12_hours",
            TimeRange::LastDay => "last_day",
            TimeRange::LastWeek => "last_week",
            TimeRange::LastMonth => "last_month",
        }
    }

    pub fn offset(&self) -> Duration {
        match self {
            TimeRange::LastHour => Duration::hours(1),
            TimeRange::Last6Hours => Duration::hours(6),
            TimeRange::Last12Hours => Duration::hours(12),
            TimeRange::LastDay => Duration::days(1),
            TimeRange::LastWeek => Duration::weeks(1),
            TimeRange::LastMonth => Duration::days(30),
        }
    }

    /// Start of the window ending at `now`.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.offset()
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| Error::InvalidRange(s.to_string()))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
