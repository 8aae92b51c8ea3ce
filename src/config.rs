use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};

use bon::Builder;
use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::{
    api::entsoe::{DEFAULT_AREA, DEFAULT_BASE_URL},
    cache::DEFAULT_TTL,
    converter::TaxMultiplier,
    error::InvalidArgument,
};

pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Helsinki;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Look up the IANA time zone by its name.
pub fn parse_zone(name: &str) -> Result<Tz, InvalidArgument> {
    name.parse().map_err(|_| InvalidArgument::TimeZone(name.to_owned()))
}

/// Resolver settings.
#[derive(Clone, Builder)]
#[must_use]
pub struct Config {
    /// ENTSO-E API key.
    #[builder(into)]
    pub security_token: String,

    #[builder(into, default = DEFAULT_BASE_URL.to_owned())]
    pub base_url: String,

    /// Bidding zone code, used both as the in- and the out-domain.
    #[builder(into, default = DEFAULT_AREA.to_owned())]
    pub area: String,

    /// Zone of the local calendar days and the hour × quarter grid.
    #[builder(default = DEFAULT_ZONE)]
    pub zone: Tz,

    #[builder(default)]
    pub tax: TaxMultiplier,

    #[builder(default = DEFAULT_TTL)]
    pub cache_ttl: TimeDelta,

    /// HTTP request timeout.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("security_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("area", &self.area)
            .field("zone", &self.zone)
            .field("tax", &self.tax)
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}
