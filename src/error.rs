use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Any failure of a price query.
///
/// The absence of prices is not an error: day-level queries return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to fetch the prices: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse the price document: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

impl Error {
    /// Whether the provider could not be reached or understood, as opposed to a caller mistake.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse(_))
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("the request timed out")]
    Timeout,

    #[error("the request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status}: the security token is invalid or expired")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("HTTP {status}: {reason}")]
    Rejected { status: u16, reason: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() { Self::Timeout } else { Self::Transport(error) }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Malformed(#[from] quick_xml::DeError),

    #[error("the document contains neither time series nor an acknowledgement reason")]
    MissingTimeSeries,

    #[error("unsupported resolution `{0}`")]
    UnsupportedResolution(String),

    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error("invalid point position {0}")]
    InvalidPosition(u32),

    #[error("implausible price {0} €/MWh")]
    InvalidPrice(rust_decimal::Decimal),

    #[error("invalid period `{0}`")]
    InvalidPeriod(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("invalid hour {0}, expected 0-23")]
    Hour(u32),

    #[error("invalid quarter {0}, expected 1-4")]
    Quarter(u32),

    #[error("invalid interval `{0}`, expected `HH` or `HH.Q`")]
    Interval(String),

    #[error("date {0} is out of range")]
    Date(NaiveDate),

    #[error("unknown time zone `{0}`")]
    TimeZone(String),

    #[error("invalid tax multiplier `{0}`, expected a number in (0, 100]")]
    TaxMultiplier(String),
}
