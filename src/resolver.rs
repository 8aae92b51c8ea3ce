//! Top-level price queries.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    api::entsoe::{Api, MarketData},
    cache::PriceCache,
    config::Config,
    converter::Converter,
    core::{DayWindow, IntervalKey, IntervalPriceSet},
    prelude::*,
    quantity::{ConsumerPrice, WholesalePrice},
    statistics::{DayStatistics, HourlyAggregate, hourly_aggregates, hourly_average},
};

/// Price of a quarter-hour together with its hour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    pub date: NaiveDate,
    pub interval: IntervalKey,

    /// `None` when the hour is priced but this particular quarter is not.
    pub wholesale: Option<WholesalePrice>,

    pub consumer: Option<ConsumerPrice>,
    pub hour: HourlyAggregate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotePair {
    pub today: PriceQuote,

    /// `None` until the next day's auction is published.
    pub tomorrow: Option<PriceQuote>,
}

/// Resolves consumer prices of the local hour × quarter grid.
///
/// `Ok(None)` stands for «no data», for example, when the next day is not published yet.
pub struct Resolver {
    cache: PriceCache,
    converter: Converter,
}

impl Resolver {
    pub fn try_new(config: &Config) -> Result<Self> {
        let api = Api::try_new(&config.base_url, &config.security_token, &config.area, config.timeout)?;
        Ok(Self::with_source(Arc::new(api), config))
    }

    pub fn with_source(source: Arc<dyn MarketData>, config: &Config) -> Self {
        Self::with_cache(
            PriceCache::new(source, config.zone, config.cache_ttl),
            Converter::new(config.tax),
        )
    }

    pub const fn with_cache(cache: PriceCache, converter: Converter) -> Self {
        Self { cache, converter }
    }

    #[must_use]
    pub const fn cache(&self) -> &PriceCache {
        &self.cache
    }

    #[must_use]
    pub const fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Current local date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.cache.now().date_naive()
    }

    /// Current local quarter-hour.
    #[must_use]
    pub fn current_interval(&self) -> IntervalKey {
        IntervalKey::from_time(&self.cache.now())
    }

    /// Mapped wholesale prices of the date.
    pub async fn day_prices(&self, date: NaiveDate) -> Result<Option<Arc<IntervalPriceSet>>> {
        let prices = self.cache.get(date).await?;
        if prices.is_empty() {
            info!(%date, "no data");
            Ok(None)
        } else {
            Ok(Some(prices))
        }
    }

    /// Validate the hour and the quarter, then resolve the quote.
    pub async fn price_at(&self, hour: u32, quarter: u32, date: NaiveDate) -> Result<Option<PriceQuote>> {
        self.price(IntervalKey::try_new(hour, quarter)?, date).await
    }

    #[instrument(skip_all, fields(date = %date, interval = %interval))]
    pub async fn price(&self, interval: IntervalKey, date: NaiveDate) -> Result<Option<PriceQuote>> {
        let Some(prices) = self.day_prices(date).await? else {
            return Ok(None);
        };
        Ok(self.quote(&prices, interval))
    }

    /// Quote the same quarter-hour today and on the following day.
    ///
    /// The following day is allowed to be missing or to fail, the failure is only logged.
    pub async fn price_with_tomorrow(
        &self,
        interval: IntervalKey,
        date: NaiveDate,
    ) -> Result<Option<QuotePair>> {
        let Some(today) = self.price(interval, date).await? else {
            return Ok(None);
        };
        let tomorrow = match date.succ_opt() {
            Some(next_date) => self.price(interval, next_date).await.unwrap_or_else(|error| {
                warn!(%next_date, "failed to resolve the next day: {error:#}");
                None
            }),
            None => None,
        };
        Ok(Some(QuotePair { today, tomorrow }))
    }

    pub async fn hourly_average(&self, hour: u32, date: NaiveDate) -> Result<Option<ConsumerPrice>> {
        let interval = IntervalKey::first_of(hour)?;
        let Some(prices) = self.day_prices(date).await? else {
            return Ok(None);
        };
        Ok(hourly_average(&prices, interval.hour(), &self.converter))
    }

    /// Aggregates of all priced hours in ascending order.
    pub async fn hourly_prices(&self, date: NaiveDate) -> Result<Option<Vec<HourlyAggregate>>> {
        let Some(prices) = self.day_prices(date).await? else {
            return Ok(None);
        };
        Ok(Some(hourly_aggregates(&prices, &self.converter)))
    }

    pub async fn statistics(&self, date: NaiveDate) -> Result<Option<DayStatistics>> {
        let Some(prices) = self.day_prices(date).await? else {
            return Ok(None);
        };
        Ok(DayStatistics::try_from_prices(&prices, &self.converter))
    }

    /// Local day boundaries of the date, without any network access.
    pub fn diagnose(&self, date: NaiveDate) -> Result<DayWindow> {
        Ok(DayWindow::try_new(date, self.cache.zone())?)
    }

    fn quote(&self, prices: &IntervalPriceSet, interval: IntervalKey) -> Option<PriceQuote> {
        let hour = HourlyAggregate::try_from_prices(prices, interval.hour(), &self.converter)?;
        let wholesale = prices.get(interval);
        Some(PriceQuote {
            date: prices.date,
            interval,
            wholesale,
            consumer: wholesale.map(|price| self.converter.to_consumer_price(price)),
            hour,
        })
    }
}
