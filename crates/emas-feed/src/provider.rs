//! Provider seams and their reqwest-backed implementations.
//!
//! A provider yields one normalized candidate per call or fails; everything
//! network-specific (headers, cookies, payload probing) stays behind the
//! trait so the poll loops and tests never touch the wire details.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;

use emas_core::RateCandidate;

use crate::error::{FeedError, FeedResult};

/// Primary source: yields a normalized gold-rate candidate.
pub trait RateProvider: Send + Sync {
    fn fetch(&self) -> impl Future<Output = FeedResult<RateCandidate>> + Send;
}

/// Secondary source: yields a provider-formatted USD/IDR price string.
pub trait FxProvider: Send + Sync {
    fn fetch(&self) -> impl Future<Output = FeedResult<String>> + Send;
}

/// Client for the Treasury gold-rate JSON API.
pub struct TreasuryClient {
    client: Client,
    url: String,
}

impl TreasuryClient {
    /// Create a client with a hard per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl RateProvider for TreasuryClient {
    async fn fetch(&self) -> FeedResult<RateCandidate> {
        let response = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, "https://treasury.id")
            .header(header::REFERER, "https://treasury.id/")
            .send()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Request(format!("HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;
        parse_rate_payload(&body)
    }
}

/// Normalize the raw rate payload into a candidate.
///
/// Rates arrive either as strings (possibly carrying a decimal fraction to
/// strip) or as numbers. Candidates with a missing timestamp or
/// non-positive rate are malformed.
pub fn parse_rate_payload(body: &Value) -> FeedResult<RateCandidate> {
    let data = body
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| FeedError::Malformed("missing data object".to_string()))?;

    let buying_rate = coerce_rate(data.get("buying_rate"));
    let selling_rate = coerce_rate(data.get("selling_rate"));
    let created_at = data
        .get("updated_at")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if buying_rate <= 0 || selling_rate <= 0 || created_at.is_empty() {
        return Err(FeedError::Malformed("incomplete rate payload".to_string()));
    }

    Ok(RateCandidate {
        buying_rate,
        selling_rate,
        created_at,
    })
}

fn coerce_rate(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(s)) => s
            .split('.')
            .next()
            .unwrap_or_default()
            .trim()
            .parse()
            .unwrap_or(0),
        Some(Value::Number(n)) => n.as_f64().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    }
}

/// The displayed USD/IDR price sits in the first element carrying these
/// CSS classes.
const QUOTE_MARKER: &str = "YMlKec fxKbKc";

/// Client for the USD/IDR quote page.
pub struct FxQuoteClient {
    client: Client,
    url: String,
}

impl FxQuoteClient {
    /// Create a client with a hard per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl FxProvider for FxQuoteClient {
    async fn fetch(&self) -> FeedResult<String> {
        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .header(header::COOKIE, "CONSENT=YES+cb.20231208-04-p0.en+FX+410")
            .send()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Request(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;
        extract_quote(&body)
            .ok_or_else(|| FeedError::Malformed("quote marker not found".to_string()))
    }
}

/// Pull the first marker-classed element's text out of the page.
pub fn extract_quote(html: &str) -> Option<String> {
    let at = html.find(QUOTE_MARKER)?;
    let rest = &html[at..];
    let start = rest.find('>')? + 1;
    let end = rest[start..].find('<')? + start;
    let price = rest[start..end].trim();
    if price.is_empty() {
        None
    } else {
        Some(price.to_string())
    }
}
