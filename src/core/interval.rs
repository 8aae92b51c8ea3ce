use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::error::InvalidArgument;

/// One 15-minute slot within a local calendar day.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, derive_more::Display)]
#[display("{hour:02}.{quarter}")]
#[must_use]
pub struct IntervalKey {
    /// Local hour, `0..=23`.
    hour: u32,

    /// Quarter of the hour, `1..=4`.
    quarter: u32,
}

impl IntervalKey {
    pub const N_HOURS: u32 = 24;
    pub const N_QUARTERS: u32 = 4;

    pub const fn try_new(hour: u32, quarter: u32) -> Result<Self, InvalidArgument> {
        if hour >= Self::N_HOURS {
            return Err(InvalidArgument::Hour(hour));
        }
        if quarter < 1 || quarter > Self::N_QUARTERS {
            return Err(InvalidArgument::Quarter(quarter));
        }
        Ok(Self { hour, quarter })
    }

    /// Slot containing the wall-clock time.
    pub fn from_time(time: &impl Timelike) -> Self {
        Self { hour: time.hour(), quarter: time.minute() / 15 + 1 }
    }

    /// The first quarter of the hour.
    pub const fn first_of(hour: u32) -> Result<Self, InvalidArgument> {
        Self::try_new(hour, 1)
    }

    /// All 96 slots of a day in chronological order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::N_HOURS).flat_map(|hour| {
            (1..=Self::N_QUARTERS).map(move |quarter| Self { hour, quarter })
        })
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn quarter(self) -> u32 {
        self.quarter
    }

    /// Same hour, another quarter.
    pub const fn with_quarter(self, quarter: u32) -> Result<Self, InvalidArgument> {
        Self::try_new(self.hour, quarter)
    }

    #[must_use]
    pub fn start_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, (self.quarter - 1) * 15, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for IntervalKey {
    type Err = InvalidArgument;

    /// Parse `HH` (the first quarter) or `HH.Q`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidArgument::Interval(value.to_owned());
        let (hour, quarter) = match value.split_once('.') {
            Some((hour, quarter)) => (hour, Some(quarter)),
            None => (value, None),
        };
        let hour = hour.trim().parse().map_err(|_| malformed())?;
        let quarter = match quarter {
            Some(quarter) => quarter.trim().parse().map_err(|_| malformed())?,
            None => 1,
        };
        Self::try_new(hour, quarter)
    }
}
