use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use quote_model::{DailyBar, HistoricalSeries, Quote};

const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The two upstream operations this service performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    CurrentQuote,
    HistoricalDaily,
}

impl DataKind {
    /// Stable name used to segment cache keys per operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::CurrentQuote => "current-quote",
            DataKind::HistoricalDaily => "historical-daily",
        }
    }

    fn function(&self) -> &'static str {
        match self {
            DataKind::CurrentQuote => "GLOBAL_QUOTE",
            DataKind::HistoricalDaily => "TIME_SERIES_DAILY_ADJUSTED",
        }
    }
}

/// Normalized failure covering every way a fetch can go wrong.
///
/// This is the only error type that crosses the fetcher boundary; raw
/// network and decode errors never escape. Callers branch on the variant,
/// not on message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Timeout,
    Connection(String),
    Upstream(String),
    Decode(String),
    NotFound { kind: DataKind, symbol: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Timeout => {
                write!(f, "request to the market data provider timed out")
            }
            FetchError::Connection(detail) => {
                write!(f, "could not reach the market data provider: {}", detail)
            }
            FetchError::Upstream(detail) => {
                write!(f, "market data provider error: {}", detail)
            }
            FetchError::Decode(detail) => {
                write!(f, "could not decode the provider response: {}", detail)
            }
            FetchError::NotFound {
                kind: DataKind::CurrentQuote,
                symbol,
            } => {
                write!(f, "sorry, we couldn't find the stock symbol {}", symbol)
            }
            FetchError::NotFound {
                kind: DataKind::HistoricalDaily,
                symbol,
            } => {
                write!(
                    f,
                    "sorry, we couldn't find historical stock data for symbol {}",
                    symbol
                )
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Upstream(format!("HTTP {}", status))
        } else {
            // without_url: the request URL carries the API key.
            FetchError::Connection(err.without_url().to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> FetchError {
        FetchError::Decode(err.to_string())
    }
}

/// Upstream source of quote data.
///
/// Implementations are injected into [`crate::fetcher::QuoteFetcher`], so
/// tests substitute a stub where production wires in
/// [`AlphaVantageClient`].
#[async_trait]
pub trait QuoteProvider {
    async fn global_quote(&self, symbol: &str) -> Result<Quote, FetchError>;
    async fn daily_series(&self, symbol: &str) -> Result<HistoricalSeries, FetchError>;
}

pub struct AlphaVantageClient {
    base_url: String,
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        AlphaVantageClient {
            base_url: ALPHAVANTAGE_BASE_URL.to_string(),
            client,
            api_key,
        }
    }

    async fn get_body(&self, kind: DataKind, symbol: &str) -> Result<String, FetchError> {
        debug!(
            "get_body | function: {} | symbol: {}",
            kind.function(),
            symbol
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", kind.function()),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    async fn global_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let body = self.get_body(DataKind::CurrentQuote, symbol).await?;
        parse_global_quote(symbol, &body)
    }

    async fn daily_series(&self, symbol: &str) -> Result<HistoricalSeries, FetchError> {
        let body = self.get_body(DataKind::HistoricalDaily, symbol).await?;
        parse_daily_series(symbol, &body)
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuoteFields>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteFields {
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailySeriesEnvelope {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

fn parse_global_quote(symbol: &str, body: &str) -> Result<Quote, FetchError> {
    let envelope: GlobalQuoteEnvelope = serde_json::from_str(body)?;

    let fields = match envelope.global_quote {
        Some(fields) => fields,
        None => {
            return Err(missing_payload(
                DataKind::CurrentQuote,
                symbol,
                envelope.error_message,
                envelope.note,
                envelope.information,
            ));
        }
    };

    // Fail fast: a quote with any labelled field absent is treated the same
    // as an unknown symbol, never returned partially filled.
    let missing = || FetchError::NotFound {
        kind: DataKind::CurrentQuote,
        symbol: symbol.to_string(),
    };

    Ok(Quote {
        price: fields.price.ok_or_else(missing)?,
        open: fields.open.ok_or_else(missing)?,
        high: fields.high.ok_or_else(missing)?,
        low: fields.low.ok_or_else(missing)?,
        volume: fields.volume.ok_or_else(missing)?,
    })
}

fn parse_daily_series(symbol: &str, body: &str) -> Result<HistoricalSeries, FetchError> {
    let envelope: DailySeriesEnvelope = serde_json::from_str(body)?;

    match envelope.time_series {
        Some(series) => Ok(series),
        None => Err(missing_payload(
            DataKind::HistoricalDaily,
            symbol,
            envelope.error_message,
            envelope.note,
            envelope.information,
        )),
    }
}

/// Classifies a response whose expected top-level key is absent.
fn missing_payload(
    kind: DataKind,
    symbol: &str,
    error_message: Option<String>,
    note: Option<String>,
    information: Option<String>,
) -> FetchError {
    if let Some(message) = error_message {
        warn!("provider rejected request | symbol: {} | {}", symbol, message);
        return FetchError::NotFound {
            kind,
            symbol: symbol.to_string(),
        };
    }

    // The provider answers throttled calls with HTTP 200 and a note body.
    if let Some(message) = note.or(information) {
        return FetchError::Upstream(message);
    }

    FetchError::NotFound {
        kind,
        symbol: symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_quote_decodes_all_fields() {
        let body = r#"{"Global Quote": {"05. price": "312.5", "02. open": "310.0", "03. high": "315.0", "04. low": "309.0", "06. volume": "1000000"}}"#;

        let quote = parse_global_quote("MSFT", body).unwrap();
        assert_eq!(
            quote,
            Quote {
                price: "312.5".to_string(),
                open: "310.0".to_string(),
                high: "315.0".to_string(),
                low: "309.0".to_string(),
                volume: "1000000".to_string(),
            }
        );
    }

    #[test]
    fn upstream_error_message_maps_to_not_found() {
        let body = r#"{"Error Message": "Invalid API call"}"#;

        let err = parse_global_quote("ZZZZINVALID", body).unwrap_err();
        assert_eq!(
            err,
            FetchError::NotFound {
                kind: DataKind::CurrentQuote,
                symbol: "ZZZZINVALID".to_string(),
            }
        );
        assert!(err.to_string().contains("ZZZZINVALID"));
    }

    #[test]
    fn missing_top_level_key_is_not_found() {
        let err = parse_global_quote("MSFT", "{}").unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[test]
    fn missing_price_field_is_not_found() {
        let body = r#"{"Global Quote": {"02. open": "310.0", "03. high": "315.0", "04. low": "309.0", "06. volume": "1000000"}}"#;

        let err = parse_global_quote("MSFT", body).unwrap_err();
        assert_eq!(
            err,
            FetchError::NotFound {
                kind: DataKind::CurrentQuote,
                symbol: "MSFT".to_string(),
            }
        );
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let err = parse_global_quote("MSFT", "<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn throttle_note_is_upstream_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;

        let err = parse_global_quote("MSFT", body).unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));
    }

    #[test]
    fn daily_series_preserves_per_date_records() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-03": {"1. open": "310.0", "2. high": "315.0", "3. low": "309.0", "4. close": "312.5", "5. adjusted close": "312.1", "6. volume": "1000000"},
            "2024-01-02": {"1. open": "305.0", "2. high": "311.0", "3. low": "304.0", "4. close": "310.0", "6. volume": "900000"}
        }}"#;

        let series = parse_daily_series("MSFT", body).unwrap();
        assert_eq!(series.len(), 2);

        let newest = &series["2024-01-03"];
        assert_eq!(newest.close, "312.5");
        assert_eq!(newest.adjusted_close.as_deref(), Some("312.1"));

        let older = &series["2024-01-02"];
        assert_eq!(older.volume, "900000");
        assert_eq!(older.adjusted_close, None);
    }

    #[test]
    fn daily_series_error_references_symbol() {
        let body = r#"{"Error Message": "Invalid API call"}"#;

        let err = parse_daily_series("ZZZZINVALID", body).unwrap_err();
        assert_eq!(
            err,
            FetchError::NotFound {
                kind: DataKind::HistoricalDaily,
                symbol: "ZZZZINVALID".to_string(),
            }
        );
        assert!(err.to_string().contains("historical"));
    }

    #[test]
    fn error_display_names_the_failure() {
        assert!(FetchError::Timeout.to_string().contains("timed out"));
        assert!(
            FetchError::Decode("expected value".to_string())
                .to_string()
                .contains("decode")
        );
        assert!(
            FetchError::Upstream("HTTP 500".to_string())
                .to_string()
                .contains("HTTP 500")
        );
    }

    #[test]
    fn cache_segments_differ_per_operation() {
        assert_ne!(
            DataKind::CurrentQuote.as_str(),
            DataKind::HistoricalDaily.as_str()
        );
    }
}
