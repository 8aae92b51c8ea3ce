use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use day_ahead::{
    Config,
    api::entsoe::{DEFAULT_AREA, DEFAULT_BASE_URL},
    config::parse_zone,
    converter::TaxMultiplier,
    core::IntervalKey,
};
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub entsoe: EntsoeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Quarter-hour price of the day and of the next day.
    #[clap(name = "price")]
    Price(PriceArgs),

    /// Hourly prices of the day.
    #[clap(name = "hours")]
    Hours(DateArgs),

    /// Cheapest and most expensive hours, and the day average.
    #[clap(name = "stats")]
    Stats(DateArgs),

    /// Show how the local day maps onto UTC, without calling the API.
    #[clap(name = "diagnose")]
    Diagnose(DiagnoseArgs),
}

#[derive(Parser)]
pub struct EntsoeArgs {
    /// ENTSO-E Transparency Platform security token.
    #[clap(long = "entsoe-api-key", env = "ENTSOE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[clap(long = "entsoe-base-url", env = "ENTSOE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Bidding zone code.
    #[clap(long = "area", env = "ENTSOE_AREA", default_value = DEFAULT_AREA)]
    area: String,

    /// IANA time zone of the local days.
    #[clap(long = "time-zone", env = "TIME_ZONE", default_value = "Europe/Helsinki", value_parser = parse_zone)]
    zone: Tz,

    /// Multiplier applied to the wholesale price, such as VAT.
    #[clap(long = "tax-multiplier", env = "TAX_MULTIPLIER", default_value = "1.255")]
    tax: TaxMultiplier,

    #[clap(long = "cache-ttl", env = "CACHE_TTL", default_value = "3h")]
    cache_ttl: humantime::Duration,

    /// HTTP request timeout.
    #[clap(long = "timeout", env = "ENTSOE_TIMEOUT", default_value = "30s")]
    timeout: humantime::Duration,
}

impl EntsoeArgs {
    pub fn config(&self) -> Result<Config> {
        let security_token = self.api_key.clone().unwrap_or_else(|| {
            warn!("`ENTSOE_API_KEY` is not set, only `diagnose` is going to work");
            String::new()
        });
        Ok(Config::builder()
            .security_token(security_token)
            .base_url(&self.base_url)
            .area(&self.area)
            .zone(self.zone)
            .tax(self.tax)
            .cache_ttl(TimeDelta::from_std(self.cache_ttl.into()).context("the cache TTL is too long")?)
            .timeout(self.timeout.into())
            .build())
    }
}

#[derive(Parser)]
pub struct DateArgs {
    /// Local date, today by default.
    #[clap(long, conflicts_with = "tomorrow")]
    date: Option<NaiveDate>,

    /// Use the next day.
    #[clap(long)]
    tomorrow: bool,
}

impl DateArgs {
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        match (self.date, self.tomorrow) {
            (Some(date), _) => Ok(date),
            (None, true) => today.succ_opt().context("there is no tomorrow"),
            (None, false) => Ok(today),
        }
    }
}

#[derive(Parser)]
pub struct PriceArgs {
    /// `HH` or `HH.Q`, the current quarter-hour by default.
    pub interval: Option<IntervalKey>,

    #[clap(flatten)]
    pub date: DateArgs,
}

#[derive(Parser)]
pub struct DiagnoseArgs {
    /// Local date, today by default.
    #[clap(long)]
    pub date: Option<NaiveDate>,
}
