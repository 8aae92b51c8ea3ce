//! Hourly and day-level aggregates in consumer units.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    converter::Converter,
    core::IntervalPriceSet,
    quantity::ConsumerPrice,
};

/// Present quarters of an hour and their average.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HourlyAggregate {
    pub hour: u32,

    /// Consumer prices by the quarter number, `1..=4`.
    pub quarters: BTreeMap<u32, ConsumerPrice>,

    pub average: ConsumerPrice,
}

impl HourlyAggregate {
    /// Aggregate the hour, or `None` when none of its quarters is priced.
    ///
    /// Quarter prices are converted first and then averaged.
    #[must_use]
    pub fn try_from_prices(prices: &IntervalPriceSet, hour: u32, converter: &Converter) -> Option<Self> {
        let quarters: BTreeMap<u32, ConsumerPrice> = prices
            .hour(hour)
            .map(|(key, price)| (key.quarter(), converter.to_consumer_price(price)))
            .collect();
        let average = ConsumerPrice::mean(quarters.values().copied())?;
        Some(Self { hour, quarters, average })
    }
}

/// Average consumer price of the hour, `None` if the hour has no prices.
#[must_use]
pub fn hourly_average(prices: &IntervalPriceSet, hour: u32, converter: &Converter) -> Option<ConsumerPrice> {
    HourlyAggregate::try_from_prices(prices, hour, converter).map(|aggregate| aggregate.average)
}

/// Aggregates of every hour with data, in chronological order.
#[must_use]
pub fn hourly_aggregates(prices: &IntervalPriceSet, converter: &Converter) -> Vec<HourlyAggregate> {
    prices
        .hours()
        .into_iter()
        .filter_map(|hour| HourlyAggregate::try_from_prices(prices, hour, converter))
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HourPrice {
    pub hour: u32,
    pub price: ConsumerPrice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayStatistics {
    pub date: NaiveDate,

    /// Cheapest hour by its average price.
    pub min: HourPrice,

    /// Most expensive hour by its average price.
    pub max: HourPrice,

    /// Mean of all priced quarters, so that every quarter weighs the same.
    pub average: ConsumerPrice,

    pub n_intervals: usize,
    pub n_hours: usize,
}

impl DayStatistics {
    /// Day statistics, or `None` for a day without prices.
    ///
    /// On equal hourly averages, the earliest hour wins for both the minimum and the maximum.
    #[must_use]
    pub fn try_from_prices(prices: &IntervalPriceSet, converter: &Converter) -> Option<Self> {
        let hours = hourly_aggregates(prices, converter)
            .into_iter()
            .map(|aggregate| HourPrice { hour: aggregate.hour, price: aggregate.average })
            .collect::<Vec<_>>();
        let min = hours.iter().copied().reduce(|min, it| if it.price < min.price { it } else { min })?;
        let max = hours.iter().copied().reduce(|max, it| if it.price > max.price { it } else { max })?;
        let average =
            ConsumerPrice::mean(prices.iter().map(|(_, price)| converter.to_consumer_price(price)))?;
        Some(Self {
            date: prices.date,
            min,
            max,
            average,
            n_intervals: prices.len(),
            n_hours: hours.len(),
        })
    }
}
