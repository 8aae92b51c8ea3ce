//! In-memory per-date cache of the mapped prices.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::{
    api::entsoe::{MarketData, document},
    core::{DayWindow, IntervalPriceSet, map_to_local_day},
    prelude::*,
};

/// Three hours.
pub const DEFAULT_TTL: TimeDelta = TimeDelta::hours(3);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    prices: Arc<IntervalPriceSet>,
    fetched_at: DateTime<Tz>,
}

/// Freshness of a cached date.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheStatus {
    pub fetched_at: DateTime<Tz>,
    pub age: TimeDelta,
    pub is_expired: bool,
}

impl CacheStatus {
    #[must_use]
    pub fn age_minutes(&self) -> i64 {
        self.age.num_minutes()
    }
}

/// Fetches, parses, and maps the prices of a local date, and keeps the non-empty results for the TTL.
///
/// Concurrent misses of the same date wait for a single fetch.
pub struct PriceCache {
    source: Arc<dyn MarketData>,
    clock: Arc<dyn Clock>,
    zone: Tz,
    ttl: TimeDelta,
    entries: Mutex<BTreeMap<NaiveDate, CacheEntry>>,
    fill_locks: Mutex<HashMap<NaiveDate, Arc<tokio::sync::Mutex<()>>>>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn MarketData>, zone: Tz, ttl: TimeDelta) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), zone, ttl)
    }

    pub fn with_clock(source: Arc<dyn MarketData>, clock: Arc<dyn Clock>, zone: Tz, ttl: TimeDelta) -> Self {
        Self {
            source,
            clock,
            zone,
            ttl,
            entries: Mutex::default(),
            fill_locks: Mutex::default(),
        }
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.zone)
    }

    /// Prices of the local date, possibly empty when the provider has none.
    #[instrument(skip_all, fields(date = %date))]
    pub async fn get(&self, date: NaiveDate) -> Result<Arc<IntervalPriceSet>> {
        if let Some(prices) = self.lookup(date) {
            trace!("hit");
            return Ok(prices);
        }

        let fill_lock = self.fill_lock(date);
        let _guard = fill_lock.lock().await;

        // Someone else could have filled it while we were waiting.
        if let Some(prices) = self.lookup(date) {
            debug!("filled concurrently");
            return Ok(prices);
        }

        let fetched_at = self.now();
        let prices = Arc::new(self.fetch(date).await?);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if prices.is_empty() {
            entries.remove(&date);
        } else {
            entries.insert(date, CacheEntry { prices: prices.clone(), fetched_at });
        }
        Ok(prices)
    }

    async fn fetch(&self, date: NaiveDate) -> Result<IntervalPriceSet> {
        let window = DayWindow::try_new(date, self.zone)?;
        let body = self.source.fetch(window.utc()).await?;
        let curve = document::parse(&body)?;
        if curve.is_empty() && !curve.reasons.is_empty() {
            info!(reasons = ?curve.reasons, "no prices");
        }
        Ok(map_to_local_day(&curve, date, self.zone))
    }

    fn lookup(&self, date: NaiveDate) -> Option<Arc<IntervalPriceSet>> {
        let now = self.now();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&date)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.prices.clone())
    }

    fn fill_lock(&self, date: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        self.fill_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(date)
            .or_default()
            .clone()
    }

    pub fn clear(&self) {
        let n_entries = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let n_entries = entries.len();
            entries.clear();
            n_entries
        };
        self.fill_locks.lock().unwrap_or_else(PoisonError::into_inner).clear();
        info!(n_entries, "cleared the cache");
    }

    /// Drop the expired entries and return how many were dropped.
    pub fn evict_expired(&self) -> usize {
        let now = self.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let n_before = entries.len();
        entries.retain(|_, entry| now - entry.fetched_at < self.ttl);
        let n_evicted = n_before - entries.len();
        debug!(n_evicted, "evicted");
        n_evicted
    }

    #[must_use]
    pub fn info(&self) -> BTreeMap<NaiveDate, CacheStatus> {
        let now = self.now();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(date, entry)| {
                let age = now - entry.fetched_at;
                (*date, CacheStatus { fetched_at: entry.fetched_at, age, is_expired: age >= self.ttl })
            })
            .collect()
    }
}
