//! [ENTSO-E Transparency Platform](https://transparency.entsoe.eu) day-ahead prices.

pub mod document;

use std::{ops::Range, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use self::document::Reason;
use crate::{core::window::PERIOD_FORMAT, error::FetchError, prelude::*};

pub const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Finnish bidding zone.
pub const DEFAULT_AREA: &str = "10YFI-1--------U";

/// Day-ahead prices document type.
const DOCUMENT_TYPE: &str = "A44";

/// Source of raw market documents.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch the price document covering the absolute period.
    ///
    /// Acknowledgement documents are returned as successful responses.
    async fn fetch(&self, period: Range<DateTime<Utc>>) -> Result<String, FetchError>;
}

pub struct Api {
    client: Client,
    base_url: String,
    security_token: String,
    area: String,
}

impl Api {
    pub fn try_new(
        base_url: impl Into<String>,
        security_token: impl Into<String>,
        area: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            security_token: security_token.into(),
            area: area.into(),
        })
    }
}

#[async_trait]
impl MarketData for Api {
    #[instrument(skip_all, fields(start = %period.start, end = %period.end, area = %self.area))]
    async fn fetch(&self, period: Range<DateTime<Utc>>) -> Result<String, FetchError> {
        info!("fetching…");
        let query = Query {
            security_token: &self.security_token,
            document_type: DOCUMENT_TYPE,
            in_domain: &self.area,
            out_domain: &self.area,
            period_start: period.start.format(PERIOD_FORMAT).to_string(),
            period_end: period.end.format(PERIOD_FORMAT).to_string(),
        };
        let response = self.client.get(&self.base_url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, len = body.len(), "fetched");
        into_document(status, body)
    }
}

/// Classify the response.
///
/// «No matching data» comes as a bad request with an acknowledgement inside, and that is a
/// regular document. Other acknowledgements are rejections.
fn into_document(status: StatusCode, body: String) -> Result<String, FetchError> {
    match status {
        _ if status.is_success() => Ok(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(FetchError::Unauthorized { status: status.as_u16() })
        }
        StatusCode::BAD_REQUEST => match document::acknowledgement(&body) {
            Some(reasons) if reasons.iter().any(Reason::is_no_matching_data) => Ok(body),
            Some(reasons) => Err(FetchError::Rejected {
                status: status.as_u16(),
                reason: reasons.into_iter().map(Reason::into_message).join("; "),
            }),
            None => {
                warn!(%status, %body, "the request failed");
                Err(FetchError::Status { status: status.as_u16() })
            }
        },
        _ => {
            warn!(%status, %body, "the request failed");
            Err(FetchError::Status { status: status.as_u16() })
        }
    }
}

#[derive(Serialize)]
struct Query<'a> {
    #[serde(rename = "securityToken")]
    security_token: &'a str,

    #[serde(rename = "documentType")]
    document_type: &'a str,

    #[serde(rename = "in_Domain")]
    in_domain: &'a str,

    #[serde(rename = "out_Domain")]
    out_domain: &'a str,

    #[serde(rename = "periodStart")]
    period_start: String,

    #[serde(rename = "periodEnd")]
    period_end: String,
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};
    use chrono_tz::Europe::Helsinki;

    use super::*;
    use crate::core::{DayWindow, map_to_local_day};

    const NO_MATCHING_DATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
    <mRID>4f3a</mRID>
    <Reason>
        <code>999</code>
        <text>No matching data found for Data item Day-ahead Prices [12.1.D]</text>
    </Reason>
</Acknowledgement_MarketDocument>"#;

    const INVALID_DOMAIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
    <mRID>4f3b</mRID>
    <Reason>
        <code>B11</code>
        <text>Invalid in_Domain value</text>
    </Reason>
</Acknowledgement_MarketDocument>"#;

    #[test]
    fn test_into_document_success() {
        let body = into_document(StatusCode::OK, "<Publication_MarketDocument/>".to_owned()).unwrap();
        assert_eq!(body, "<Publication_MarketDocument/>");
    }

    #[test]
    fn test_into_document_unauthorized() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let error = into_document(status, "<html>Unauthorized</html>".to_owned()).unwrap_err();
            assert!(matches!(error, FetchError::Unauthorized { status: code } if code == status.as_u16()));
            assert!(error.to_string().contains("invalid or expired"));
        }
    }

    #[test]
    fn test_into_document_no_matching_data() {
        let body = into_document(StatusCode::BAD_REQUEST, NO_MATCHING_DATA.to_owned()).unwrap();
        let curve = document::parse(&body).unwrap();
        assert!(curve.is_empty());
    }

    #[test]
    fn test_into_document_rejected() {
        let error = into_document(StatusCode::BAD_REQUEST, INVALID_DOMAIN.to_owned()).unwrap_err();
        assert!(matches!(
            &error,
            FetchError::Rejected { status: 400, reason } if reason == "Invalid in_Domain value (B11)",
        ));
    }

    #[test]
    fn test_into_document_bad_request() {
        let error = into_document(StatusCode::BAD_REQUEST, "Bad Request".to_owned()).unwrap_err();
        assert!(matches!(error, FetchError::Status { status: 400 }));
    }

    #[test]
    fn test_into_document_unavailable() {
        let error = into_document(StatusCode::SERVICE_UNAVAILABLE, String::new()).unwrap_err();
        assert!(matches!(error, FetchError::Status { status: 503 }));
        assert!(crate::Error::from(error).is_fetch_failure());
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_fetch_ok() -> crate::Result<()> {
        let security_token = std::env::var("ENTSOE_API_KEY").unwrap();
        let api = Api::try_new(DEFAULT_BASE_URL, security_token, DEFAULT_AREA, Duration::from_secs(30))?;
        let date: NaiveDate = Local::now().date_naive();
        let window = DayWindow::try_new(date, Helsinki)?;
        let curve = document::parse(&api.fetch(window.utc()).await?)?;
        let prices = map_to_local_day(&curve, date, Helsinki);
        assert!(!prices.is_empty());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_fetch_unauthorized() -> crate::Result<()> {
        let api = Api::try_new(DEFAULT_BASE_URL, "invalid", DEFAULT_AREA, Duration::from_secs(30))?;
        let window = DayWindow::try_new(Local::now().date_naive(), Helsinki)?;
        assert!(matches!(api.fetch(window.utc()).await, Err(FetchError::Unauthorized { .. })));
        Ok(())
    }
}
