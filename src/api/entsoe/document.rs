//! `Publication_MarketDocument` and `Acknowledgement_MarketDocument` of the day-ahead prices.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    core::{Curve, Resolution},
    error::ParseError,
    prelude::*,
    quantity::WholesalePrice,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// Curve type which omits points that repeat the previous price.
const VARIABLE_SIZED_BLOCK: &str = "A03";

/// Upper bound of a plausible clearing price, either sign, in €/MWh.
const MAX_ABS_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Upper bound of a period length, a week of quarter-hours.
const MAX_POSITIONS: u32 = 7 * 24 * 4;

/// Reason code of «No matching data found».
pub const NO_MATCHING_DATA: &str = "999";

/// Parse the provider's XML into a curve.
///
/// All time series are merged, the later point wins on the same instant. If the document mixes
/// resolutions, coarser points are split into the finest steps and finer points win where both
/// cover the same instant.
#[instrument(skip_all, fields(len = document.len()))]
pub fn parse(document: &str) -> Result<Curve, ParseError> {
    let document: MarketDocument = quick_xml::de::from_str(document)?;

    if document.time_series.is_empty() {
        if document.reasons.is_empty() {
            return Err(ParseError::MissingTimeSeries);
        }
        let reasons = document.reasons.into_iter().map(Reason::into_message).collect_vec();
        info!(?reasons, "the provider has nothing to publish");
        return Ok(Curve::unavailable(reasons));
    }

    let mut periods = Vec::new();
    for series in document.time_series {
        let is_compressed = series.curve_type.as_deref() == Some(VARIABLE_SIZED_BLOCK);
        for period in series.periods {
            periods.push((period.resolution.parse::<Resolution>()?, is_compressed, period));
        }
    }
    let Some(resolution) = periods.iter().map(|(resolution, _, _)| *resolution).min() else {
        return Err(ParseError::MissingTimeSeries);
    };

    // Coarsest first, so that finer points overwrite the split ones.
    periods.sort_by_key(|(period_resolution, _, _)| std::cmp::Reverse(*period_resolution));

    let mut curve = Curve::new(resolution);
    for (period_resolution, is_compressed, period) in periods {
        let prices = period.into_prices(period_resolution, is_compressed)?;
        if period_resolution == resolution {
            curve.prices.extend(prices);
        } else {
            debug!(%period_resolution, %resolution, n_points = prices.len(), "splitting a coarser period");
            let n_steps = i32::try_from(period_resolution.minutes() / resolution.minutes()).unwrap_or(1);
            for (instant, price) in prices {
                curve.prices.extend((0..n_steps).map(|step| (instant + resolution.step() * step, price)));
            }
        }
    }
    debug!(%resolution, n_points = curve.len(), "parsed");
    Ok(curve)
}

/// Reasons of an acknowledgement document, `None` if the document is anything else.
#[must_use]
pub fn acknowledgement(document: &str) -> Option<Vec<Reason>> {
    let document: MarketDocument = quick_xml::de::from_str(document).ok()?;
    (document.time_series.is_empty() && !document.reasons.is_empty()).then_some(document.reasons)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map(|timestamp| timestamp.and_utc())
        .map_err(|_| ParseError::InvalidTimestamp(value.to_owned()))
}

#[derive(Deserialize)]
struct MarketDocument {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeries>,

    #[serde(rename = "Reason", default)]
    reasons: Vec<Reason>,
}

#[derive(Debug, Deserialize)]
pub struct Reason {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

impl Reason {
    #[must_use]
    pub fn is_no_matching_data(&self) -> bool {
        self.code.as_deref() == Some(NO_MATCHING_DATA)
    }

    #[must_use]
    pub fn into_message(self) -> String {
        match (self.code, self.text) {
            (Some(code), Some(text)) => format!("{text} ({code})"),
            (None, Some(text)) => text,
            (Some(code), None) => format!("reason code {code}"),
            (None, None) => "unknown reason".to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct TimeSeries {
    #[serde(rename = "curveType", default)]
    curve_type: Option<String>,

    #[serde(rename = "Period")]
    periods: Vec<Period>,
}

#[derive(Deserialize)]
struct Period {
    #[serde(rename = "timeInterval")]
    time_interval: TimeInterval,

    resolution: String,

    #[serde(rename = "Point", default)]
    points: Vec<Point>,
}

#[derive(Deserialize)]
struct TimeInterval {
    start: String,

    #[serde(default)]
    end: Option<String>,
}

#[serde_as]
#[derive(Deserialize)]
struct Point {
    position: u32,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "price.amount")]
    price: Decimal,
}

impl Period {
    /// Absolute instants of the points: `start + (position - 1) × resolution`.
    ///
    /// Positions must fit into the period. Compressed series carry the previous price over the
    /// omitted positions until the end of the period.
    fn into_prices(
        self,
        resolution: Resolution,
        is_compressed: bool,
    ) -> Result<BTreeMap<DateTime<Utc>, WholesalePrice>, ParseError> {
        let start = parse_timestamp(&self.time_interval.start)?;
        let n_positions = match &self.time_interval.end {
            Some(end) => {
                let n_minutes = (parse_timestamp(end)? - start).num_minutes();
                u32::try_from(n_minutes / resolution.minutes())
                    .ok()
                    .filter(|n_positions| *n_positions <= MAX_POSITIONS)
                    .ok_or_else(|| ParseError::InvalidPeriod(format!("{}..{end}", self.time_interval.start)))?
            }
            None => MAX_POSITIONS,
        };

        let mut points = BTreeMap::new();
        for point in self.points {
            if !(1..=n_positions).contains(&point.position) {
                return Err(ParseError::InvalidPosition(point.position));
            }
            if point.price.abs() > MAX_ABS_PRICE {
                return Err(ParseError::InvalidPrice(point.price));
            }
            points.insert(point.position, WholesalePrice(point.price));
        }

        // Positions are bounded, so the offset always fits.
        let instant_of = |position: u32| start + resolution.step() * i32::try_from(position - 1).unwrap_or(0);

        if !is_compressed || self.time_interval.end.is_none() {
            return Ok(points.into_iter().map(|(position, price)| (instant_of(position), price)).collect());
        }

        let mut prices = BTreeMap::new();
        let mut last_price = None;
        for position in 1..=n_positions {
            if let Some(price) = points.get(&position) {
                last_price = Some(*price);
            }
            if let Some(price) = last_price {
                prices.insert(instant_of(position), price);
            }
        }
        Ok(prices)
    }
}
