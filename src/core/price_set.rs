use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::{
    core::{IntervalKey, Resolution},
    quantity::WholesalePrice,
};

/// Wholesale prices of one local calendar date on the hour × quarter grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct IntervalPriceSet {
    pub date: NaiveDate,

    /// Native resolution of the source curve, `None` if the provider published nothing.
    pub resolution: Option<Resolution>,

    prices: BTreeMap<IntervalKey, WholesalePrice>,
}

impl IntervalPriceSet {
    pub fn new(
        date: NaiveDate,
        resolution: Option<Resolution>,
        prices: BTreeMap<IntervalKey, WholesalePrice>,
    ) -> Self {
        Self { date, resolution, prices }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, None, BTreeMap::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn get(&self, key: IntervalKey) -> Option<WholesalePrice> {
        self.prices.get(&key).copied()
    }

    /// Prices in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (IntervalKey, WholesalePrice)> + '_ {
        self.prices.iter().map(|(key, price)| (*key, *price))
    }

    /// Present quarters of the hour.
    pub fn hour(&self, hour: u32) -> impl Iterator<Item = (IntervalKey, WholesalePrice)> + '_ {
        self.prices
            .iter()
            .filter(move |(key, _)| key.hour() == hour)
            .map(|(key, price)| (*key, *price))
    }

    /// Distinct hours with at least one price.
    #[must_use]
    pub fn hours(&self) -> BTreeSet<u32> {
        self.prices.keys().map(|key| key.hour()).collect()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::InvalidArgument;

    #[test]
    fn test_hour() -> Result<(), InvalidArgument> {
        let prices = BTreeMap::from([
            (IntervalKey::try_new(0, 4)?, WholesalePrice(dec!(1))),
            (IntervalKey::try_new(1, 2)?, WholesalePrice(dec!(2))),
            (IntervalKey::try_new(1, 1)?, WholesalePrice(dec!(3))),
            (IntervalKey::try_new(2, 1)?, WholesalePrice(dec!(4))),
        ]);
        let set = IntervalPriceSet::new(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            Some(Resolution::Quarterly),
            prices,
        );
        assert_eq!(
            set.hour(1).collect_vec(),
            [
                (IntervalKey::try_new(1, 1)?, WholesalePrice(dec!(3))),
                (IntervalKey::try_new(1, 2)?, WholesalePrice(dec!(2))),
            ]
        );
        assert_eq!(set.hours(), BTreeSet::from([0, 1, 2]));
        assert_eq!(set.len(), 4);
        Ok(())
    }
}
