use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{error::ParseError, quantity::WholesalePrice};

/// Native resolution of a published price curve.
///
/// Ordered from the finest to the coarsest.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, derive_more::Display)]
pub enum Resolution {
    #[display("PT15M")]
    Quarterly,

    #[display("PT60M")]
    Hourly,
}

impl Resolution {
    #[must_use]
    pub const fn minutes(self) -> i64 {
        match self {
            Self::Quarterly => 15,
            Self::Hourly => 60,
        }
    }

    #[must_use]
    pub fn step(self) -> TimeDelta {
        TimeDelta::minutes(self.minutes())
    }
}

impl FromStr for Resolution {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PT15M" => Ok(Self::Quarterly),
            "PT60M" => Ok(Self::Hourly),
            _ => Err(ParseError::UnsupportedResolution(value.to_owned())),
        }
    }
}

/// Sparse wholesale prices keyed by the UTC start of their interval.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Curve {
    /// `None` when the document carried no price series at all.
    pub resolution: Option<Resolution>,

    pub prices: BTreeMap<DateTime<Utc>, WholesalePrice>,

    /// Reasons reported by the provider when it had nothing to publish.
    pub reasons: Vec<String>,
}

impl Curve {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution: Some(resolution), ..Self::default() }
    }

    pub fn unavailable(reasons: Vec<String>) -> Self {
        Self { reasons, ..Self::default() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_from_str() {
        assert_eq!("PT15M".parse::<Resolution>().ok(), Some(Resolution::Quarterly));
        assert_eq!("PT60M".parse::<Resolution>().ok(), Some(Resolution::Hourly));
        assert!(matches!(
            "PT30M".parse::<Resolution>(),
            Err(ParseError::UnsupportedResolution(value)) if value == "PT30M",
        ));
    }

    #[test]
    fn test_resolution_order() {
        assert!(Resolution::Quarterly < Resolution::Hourly);
        assert_eq!(Resolution::Hourly.step(), TimeDelta::hours(1));
    }
}
