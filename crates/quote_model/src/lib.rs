//! Data types shared across the quote fetching and web crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point-in-time price snapshot for one symbol.
///
/// Values stay `String`s, preserved exactly as the upstream source formats
/// them, so nothing is reformatted or rounded on the way to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub volume: String,
}

/// One trading day of a daily-adjusted time series.
///
/// Serde renames follow the provider's numbered field labels, so the type
/// decodes straight out of the upstream payload and round-trips through the
/// cache unchanged. The adjusted fields are absent on some instruments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. adjusted close", skip_serializing_if = "Option::is_none")]
    pub adjusted_close: Option<String>,
    #[serde(rename = "6. volume")]
    pub volume: String,
    #[serde(rename = "7. dividend amount", skip_serializing_if = "Option::is_none")]
    pub dividend_amount: Option<String>,
    #[serde(rename = "8. split coefficient", skip_serializing_if = "Option::is_none")]
    pub split_coefficient: Option<String>,
}

/// Per-date daily records keyed by `YYYY-MM-DD` date strings.
///
/// Key order carries no meaning; callers that want chronological output
/// sort the dates themselves.
pub type HistoricalSeries = HashMap<String, DailyBar>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_bar_decodes_provider_labels() {
        let body = r#"{
            "1. open": "310.0",
            "2. high": "315.0",
            "3. low": "309.0",
            "4. close": "312.5",
            "5. adjusted close": "312.1",
            "6. volume": "1000000",
            "7. dividend amount": "0.0000",
            "8. split coefficient": "1.0"
        }"#;

        let bar: DailyBar = serde_json::from_str(body).unwrap();
        assert_eq!(bar.open, "310.0");
        assert_eq!(bar.close, "312.5");
        assert_eq!(bar.adjusted_close.as_deref(), Some("312.1"));
        assert_eq!(bar.volume, "1000000");
    }

    #[test]
    fn daily_bar_adjusted_fields_are_optional() {
        let body = r#"{
            "1. open": "1.0",
            "2. high": "2.0",
            "3. low": "0.5",
            "4. close": "1.5",
            "6. volume": "100"
        }"#;

        let bar: DailyBar = serde_json::from_str(body).unwrap();
        assert_eq!(bar.adjusted_close, None);
        assert_eq!(bar.dividend_amount, None);
        assert_eq!(bar.split_coefficient, None);
    }

    #[test]
    fn daily_bar_round_trips_through_json() {
        let bar = DailyBar {
            open: "310.0".to_string(),
            high: "315.0".to_string(),
            low: "309.0".to_string(),
            close: "312.5".to_string(),
            adjusted_close: None,
            volume: "1000000".to_string(),
            dividend_amount: None,
            split_coefficient: None,
        };

        let raw = serde_json::to_string(&bar).unwrap();
        let restored: DailyBar = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, bar);
    }
}
