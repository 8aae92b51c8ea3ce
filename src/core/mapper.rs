use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    core::{Curve, IntervalKey, IntervalPriceSet, Resolution},
    prelude::*,
};

/// Place the curve onto the hour × quarter grid of the local date.
///
/// Points that fall onto another local date are dropped. When the wall clock repeats an hour,
/// the later occurrence wins. Hourly points are copied into all four quarters of their hour.
#[instrument(skip_all, fields(date = %date, zone = %zone, n_points = curve.len()))]
pub fn map_to_local_day(curve: &Curve, date: NaiveDate, zone: Tz) -> IntervalPriceSet {
    let mut prices = BTreeMap::new();
    let mut n_discarded = 0_usize;

    for (instant, price) in &curve.prices {
        let local = instant.with_timezone(&zone);
        if local.date_naive() != date {
            trace!(%local, "outside of the day");
            n_discarded += 1;
            continue;
        }
        prices.insert(IntervalKey::from_time(&local), *price);
    }

    if curve.resolution == Some(Resolution::Hourly) {
        let first_quarters: Vec<_> =
            prices.iter().filter(|(key, _)| key.quarter() == 1).map(|(k, p)| (*k, *p)).collect();
        for (key, price) in first_quarters {
            for quarter in 2..=IntervalKey::N_QUARTERS {
                if let Ok(key) = key.with_quarter(quarter) {
                    prices.insert(key, price);
                }
            }
        }
    }

    if n_discarded != 0 {
        debug!(n_discarded, "dropped points of neighbouring days");
    }
    debug!(n_intervals = prices.len(), "mapped");
    IntervalPriceSet::new(date, curve.resolution, prices)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};
    use chrono_tz::Europe::Helsinki;
    use itertools::Itertools;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{core::DayWindow, error::InvalidArgument, quantity::WholesalePrice};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Consecutive points starting at `start`, priced by their index.
    fn curve(resolution: Resolution, start: DateTime<Utc>, n_points: i32) -> Curve {
        let mut curve = Curve::new(resolution);
        for index in 0..n_points {
            curve
                .prices
                .insert(start + resolution.step() * index, WholesalePrice(Decimal::from(index)));
        }
        curve
    }

    #[test]
    fn test_hourly_point_fills_all_quarters() -> Result<(), InvalidArgument> {
        let start = DayWindow::try_new(date(2025, 6, 15), Helsinki)?.start.to_utc();
        let mut curve = Curve::new(Resolution::Hourly);
        curve.prices.insert(start, WholesalePrice(dec!(42.5)));

        let set = map_to_local_day(&curve, date(2025, 6, 15), Helsinki);

        assert_eq!(set.len(), 4);
        for quarter in 1..=4 {
            assert_eq!(set.get(IntervalKey::try_new(0, quarter)?), Some(WholesalePrice(dec!(42.5))));
        }
        Ok(())
    }

    #[test]
    fn test_quarterly_regular_day() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 6, 15), Helsinki)?;
        let set =
            map_to_local_day(&curve(Resolution::Quarterly, window.start.to_utc(), 96), window.date, Helsinki);
        assert_eq!(set.len(), 96);
        assert_eq!(set.iter().map(|(key, _)| key).collect_vec(), IntervalKey::all().collect_vec());
        assert_eq!(set.get(IntervalKey::try_new(13, 2)?), Some(WholesalePrice(dec!(53))));
        Ok(())
    }

    #[test]
    fn test_points_of_neighbouring_days_are_dropped() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 6, 15), Helsinki)?;
        // One hour before and one hour after the local day:
        let curve = curve(Resolution::Hourly, window.start.to_utc() - TimeDelta::hours(1), 26);
        let set = map_to_local_day(&curve, window.date, Helsinki);
        assert_eq!(set.len(), 96);
        assert_eq!(set.hours().len(), 24);
        assert_eq!(set.get(IntervalKey::try_new(0, 1)?), Some(WholesalePrice(dec!(1))));
        assert_eq!(set.get(IntervalKey::try_new(23, 4)?), Some(WholesalePrice(dec!(24))));
        Ok(())
    }

    #[test]
    fn test_spring_forward_day_has_no_3am() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 3, 30), Helsinki)?;
        let n_quarters = i32::try_from(window.duration().num_minutes() / 15).unwrap();
        assert_eq!(n_quarters, 92);

        let set = map_to_local_day(
            &curve(Resolution::Quarterly, window.start.to_utc(), n_quarters),
            window.date,
            Helsinki,
        );

        assert_eq!(set.len(), 92);
        assert_eq!(set.hours().len(), 23);
        assert!(!set.hours().contains(&3));
        assert!(set.hours().iter().all(|hour| *hour <= 23));
        // 04:00 local is the 12th quarter of the day (00:00–03:00 offset +2, then +3):
        assert_eq!(set.get(IntervalKey::try_new(4, 1)?), Some(WholesalePrice(dec!(12))));
        Ok(())
    }

    #[test]
    fn test_fall_back_day_keeps_later_repeated_hour() -> Result<(), InvalidArgument> {
        let window = DayWindow::try_new(date(2025, 10, 26), Helsinki)?;
        let n_hours = i32::try_from(window.duration().num_hours()).unwrap();
        assert_eq!(n_hours, 25);

        let set =
            map_to_local_day(&curve(Resolution::Hourly, window.start.to_utc(), n_hours), window.date, Helsinki);

        assert_eq!(set.len(), 96);
        assert_eq!(set.hours().into_iter().collect_vec(), (0..24).collect_vec());
        // The wall clock shows 03:xx twice, at the 3rd and the 4th hour of the day:
        assert_eq!(set.get(IntervalKey::try_new(3, 1)?), Some(WholesalePrice(dec!(4))));
        assert_eq!(set.get(IntervalKey::try_new(3, 4)?), Some(WholesalePrice(dec!(4))));
        assert_eq!(set.get(IntervalKey::try_new(23, 1)?), Some(WholesalePrice(dec!(24))));
        Ok(())
    }

    #[test]
    fn test_empty_curve() {
        let set = map_to_local_day(&Curve::unavailable(vec![]), date(2025, 6, 15), Helsinki);
        assert!(set.is_empty());
        assert_eq!(set.resolution, None);
    }
}
