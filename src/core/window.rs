use std::{
    fmt::{Debug, Display, Formatter},
    ops::Range,
};

use chrono::{
    DateTime,
    FixedOffset,
    MappedLocalTime,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    Offset,
    TimeDelta,
    TimeZone,
    Utc,
};
use chrono_tz::Tz;

use crate::error::InvalidArgument;

/// Timestamp format of the ENTSO-E `periodStart` and `periodEnd` parameters.
pub const PERIOD_FORMAT: &str = "%Y%m%d%H%M";

/// Local calendar day and its absolute boundaries.
///
/// The boundaries are local midnights converted to absolute time, so the window spans 23 or
/// 25 hours on the days when the zone changes its UTC offset.
#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct DayWindow {
    pub date: NaiveDate,

    /// Inclusive.
    pub start: DateTime<Tz>,

    /// Exclusive.
    pub end: DateTime<Tz>,
}

impl Debug for DayWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}..{:?}", self.date, self.start, self.end)
    }
}

impl DayWindow {
    pub fn try_new(date: NaiveDate, zone: Tz) -> Result<Self, InvalidArgument> {
        let next_date = date.succ_opt().ok_or(InvalidArgument::Date(date))?;
        Ok(Self { date, start: start_of_day(date, zone)?, end: start_of_day(next_date, zone)? })
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        (self.start <= instant) && (instant < self.end)
    }

    #[must_use]
    pub fn utc(&self) -> Range<DateTime<Utc>> {
        self.start.to_utc()..self.end.to_utc()
    }

    /// UTC offset in effect at the start of the day.
    #[must_use]
    pub fn start_offset(&self) -> FixedOffset {
        self.start.offset().fix()
    }

    /// UTC offset in effect at the end of the day.
    #[must_use]
    pub fn end_offset(&self) -> FixedOffset {
        self.end.offset().fix()
    }

    #[must_use]
    pub fn period_start(&self) -> String {
        self.start.to_utc().format(PERIOD_FORMAT).to_string()
    }

    #[must_use]
    pub fn period_end(&self) -> String {
        self.end.to_utc().format(PERIOD_FORMAT).to_string()
    }
}

impl Display for DayWindow {
    #[expect(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "date:         {}", self.date)?;
        writeln!(f, "zone:         {}", self.start.timezone())?;
        writeln!(f, "local start:  {}", self.start.format("%Y-%m-%d %H:%M:%S %Z%z"))?;
        writeln!(f, "utc start:    {}", self.start.to_utc().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "local end:    {}", self.end.format("%Y-%m-%d %H:%M:%S %Z%z"))?;
        writeln!(f, "utc end:      {}", self.end.to_utc().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "period start: {}", self.period_start())?;
        writeln!(f, "period end:   {}", self.period_end())?;
        writeln!(f, "offset:       {}", self.start_offset())?;
        write!(f, "hours:        {}", self.duration().num_minutes() as f64 / 60.0)
    }
}

/// Localise the midnight of the date.
///
/// When midnight falls into a gap, the day starts at the first wall-clock time that exists.
/// When midnight is ambiguous, the earlier instant wins.
fn start_of_day(date: NaiveDate, zone: Tz) -> Result<DateTime<Tz>, InvalidArgument> {
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN);
    match zone.from_local_datetime(&midnight) {
        MappedLocalTime::Single(start) | MappedLocalTime::Ambiguous(start, _) => Ok(start),
        MappedLocalTime::None => (1..=96)
            .map(|n_quarters| midnight + TimeDelta::minutes(15 * n_quarters))
            .find_map(|local| zone.from_local_datetime(&local).earliest())
            .ok_or(InvalidArgument::Date(date)),
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::{America::Santiago, Europe::Helsinki};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn utc(value: &str) -> DateTime<Utc> {
        value.parse().unwrap()
    }

    #[test]
    fn test_regular_day() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 6, 15), Helsinki)?;
        assert_eq!(window.duration(), TimeDelta::hours(24));
        assert_eq!(window.utc(), utc("2025-06-14T21:00:00Z")..utc("2025-06-15T21:00:00Z"));
        assert_eq!(window.period_start(), "202506142100");
        assert_eq!(window.period_end(), "202506152100");
        assert_eq!(window.start_offset(), FixedOffset::east_opt(3 * 3600).unwrap());
        Ok(())
    }

    #[test]
    fn test_spring_forward_day_is_23_hours() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 3, 30), Helsinki)?;
        assert_eq!(window.duration(), TimeDelta::hours(23));
        assert_eq!(window.period_start(), "202503292200");
        assert_eq!(window.period_end(), "202503302100");
        assert_ne!(window.start_offset(), window.end_offset());
        Ok(())
    }

    #[test]
    fn test_fall_back_day_is_25_hours() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 10, 26), Helsinki)?;
        assert_eq!(window.duration(), TimeDelta::hours(25));
        assert_eq!(window.period_start(), "202510252100");
        assert_eq!(window.period_end(), "202510262200");
        Ok(())
    }

    #[test]
    fn test_day_after_fall_back_is_24_hours() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 10, 27), Helsinki)?;
        assert_eq!(window.duration(), TimeDelta::hours(24));
        Ok(())
    }

    #[test]
    fn test_midnight_in_gap_starts_at_first_existing_time() -> Result<(), InvalidArgument> {
        // Chile springs forward at midnight:
        let window = DayWindow::try_new(date(2024, 9, 8), Santiago)?;
        assert_eq!(window.start.to_utc(), utc("2024-09-08T04:00:00Z"));
        assert_eq!(window.start.format("%H:%M").to_string(), "01:00");
        assert_eq!(window.duration(), TimeDelta::hours(23));
        Ok(())
    }

    #[test]
    fn test_contains() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 6, 15), Helsinki)?;
        assert!(window.contains(utc("2025-06-14T21:00:00Z")));
        assert!(window.contains(utc("2025-06-15T20:45:00Z")));
        assert!(!window.contains(utc("2025-06-15T21:00:00Z")));
        assert!(!window.contains(utc("2025-06-14T20:45:00Z")));
        Ok(())
    }

    #[test]
    fn test_last_date_is_rejected() {
        assert_eq!(
            DayWindow::try_new(NaiveDate::MAX, Helsinki),
            Err(InvalidArgument::Date(NaiveDate::MAX))
        );
    }

    #[test]
    fn test_display() -> Result<(), InvalidArgument> {
        let report = DayWindow::try_new(date(2025, 3, 30), Helsinki)?.to_string();
        assert!(report.contains("period start: 202503292200"), "{report}");
        assert!(report.contains("hours:        23"), "{report}");
        Ok(())
    }
}
