//! Yahoo Finance data fetcher
//!
//! Daily price history, latest close and the 10-year Treasury yield
//! (`^TNX`, used as the risk-free proxy) from Yahoo's unofficial chart API.
//!
//! Note: This is for educational/research purposes. Yahoo Finance
//! data is delayed and intended for personal use.

use chrono::{DateTime, Duration, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;

use super::provider::{with_retries, MarketDataProvider, ProviderConfig};
use crate::core::{HedgeError, HedgeResult, PriceBar, PriceFrame};

/// Symbol whose previous close / 100 is the risk-free rate
pub const TREASURY_10Y_SYMBOL: &str = "^TNX";

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
    config: ProviderConfig,
}

impl YahooClient {
    pub fn new() -> HedgeResult<Self> {
        Self::with_config(ProviderConfig::default())
    }

    pub fn with_config(config: ProviderConfig) -> HedgeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(config.timeout())
            .build()
            .map_err(|e| HedgeError::data_unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: "https://query1.finance.yahoo.com/v8/finance".to_string(),
            config,
        })
    }

    /// Point the client at another host (mirrors, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One chart request, no retries
    fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> HedgeResult<ChartData> {
        let url = format!("{}/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| HedgeError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(HedgeError::Network(format!("{} returned {}", url, status)));
        }
        if !status.is_success() {
            return Err(HedgeError::data_unavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        let body: ChartResponse = response
            .json()
            .map_err(|e| HedgeError::data_unavailable(format!("Failed to parse chart: {}", e)))?;

        body.into_data(symbol)
    }

    fn chart(&self, symbol: &str, query: &[(&str, String)]) -> HedgeResult<ChartData> {
        with_retries(&self.config, &format!("chart request for {}", symbol), || {
            self.fetch_chart(symbol, query)
        })
    }

    /// Daily bars between two dates (inclusive)
    pub fn get_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HedgeResult<PriceFrame> {
        if end < start {
            return Err(HedgeError::invalid_input(format!(
                "history range ends ({}) before it starts ({})",
                end, start
            )));
        }
        let query = [
            ("period1", unix_midnight(start)?.to_string()),
            // period2 is exclusive
            ("period2", unix_midnight(end + Duration::days(1))?.to_string()),
            ("interval", "1d".to_string()),
        ];

        let data = self.chart(symbol, &query)?;
        let frame = data.to_frame(symbol);
        tracing::info!("Fetched {} bars for {} ({} to {})", frame.len(), symbol, start, end);
        Ok(frame)
    }

    /// Last non-missing daily close
    pub fn get_latest_close(&self, symbol: &str) -> HedgeResult<f64> {
        let query = [("range", "5d".to_string()), ("interval", "1d".to_string())];
        let data = self.chart(symbol, &query)?;

        data.to_frame(symbol)
            .bars
            .iter()
            .rev()
            .find_map(|b| b.close.filter(|c| c.is_finite()))
            .ok_or_else(|| HedgeError::data_unavailable(format!("no recent close for {}", symbol)))
    }

    /// Previous close of the 10-year yield, as a fraction
    pub fn get_risk_free_rate(&self) -> HedgeResult<f64> {
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];
        let data = self.chart(TREASURY_10Y_SYMBOL, &query)?;

        let yield_pct = data
            .meta
            .previous_close
            .or(data.meta.chart_previous_close)
            .ok_or_else(|| HedgeError::data_unavailable("Could not retrieve risk-free rate"))?;

        Ok(yield_to_rate(yield_pct, self.config.round_rate_to))
    }
}

impl MarketDataProvider for YahooClient {
    fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HedgeResult<PriceFrame> {
        self.get_price_history(symbol, start, end)
    }

    fn latest_close(&self, symbol: &str) -> HedgeResult<f64> {
        self.get_latest_close(symbol)
    }

    fn risk_free_rate(&self) -> HedgeResult<f64> {
        self.get_risk_free_rate()
    }
}

/// Percent yield to decimal rate, optionally rounded
pub fn yield_to_rate(yield_pct: f64, round_to: Option<u32>) -> f64 {
    let rate = yield_pct / 100.0;
    match round_to {
        Some(decimals) => {
            let scale = 10f64.powi(decimals as i32);
            (rate * scale).round() / scale
        }
        None => rate,
    }
}

fn unix_midnight(date: NaiveDate) -> HedgeResult<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| HedgeError::invalid_input(format!("invalid date {}", date)))
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "previousClose")]
    previous_close: Option<f64>,
    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    fn into_data(self, symbol: &str) -> HedgeResult<ChartData> {
        if let Some(err) = self.chart.error {
            return Err(HedgeError::data_unavailable(format!(
                "{}: {} ({})",
                symbol,
                err.description.unwrap_or_default(),
                err.code.unwrap_or_default()
            )));
        }
        self.chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| HedgeError::data_unavailable(format!("No chart data returned for {}", symbol)))
    }
}

impl ChartData {
    fn to_frame(&self, symbol: &str) -> PriceFrame {
        let quote = self.indicators.quote.first();
        let adj = self.indicators.adjclose.first();
        let at = |col: Option<&Vec<Option<f64>>>, i: usize| col.and_then(|c| c.get(i).copied().flatten());

        let bars = self
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = DateTime::from_timestamp(ts + self.meta.gmtoffset, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: at(quote.map(|q| &q.open), i),
                    high: at(quote.map(|q| &q.high), i),
                    low: at(quote.map(|q| &q.low), i),
                    close: at(quote.map(|q| &q.close), i),
                    adj_close: at(adj.map(|a| &a.adjclose), i),
                    volume: quote.and_then(|q| q.volume.get(i).copied().flatten()),
                })
            })
            .collect();

        PriceFrame::new(symbol, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_FIXTURE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "TEST", "gmtoffset": -14400, "chartPreviousClose": 99.5},
                "timestamp": [1717421400, 1717507800, 1717594200],
                "indicators": {
                    "quote": [{
                        "open": [100.0, 101.0, null],
                        "high": [102.0, 103.0, 104.0],
                        "low": [99.0, 100.0, 101.0],
                        "close": [101.0, 102.0, 103.0],
                        "volume": [1000, 2000, 3000]
                    }],
                    "adjclose": [{"adjclose": [101.0, 102.0, 103.0]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_fixture() {
        let response: ChartResponse = serde_json::from_str(CHART_FIXTURE).unwrap();
        let data = response.into_data("TEST").unwrap();
        let frame = data.to_frame("TEST");

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.bars[0].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(frame.bars[1].close, Some(102.0));
        assert_eq!(frame.bars[2].open, None);
        assert_eq!(frame.bars[2].volume, Some(3000));
        assert_eq!(data.meta.chart_previous_close, Some(99.5));
    }

    #[test]
    fn test_chart_error_is_unavailable() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();

        assert!(matches!(
            response.into_data("NOPE"),
            Err(HedgeError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_yield_to_rate() {
        assert_eq!(yield_to_rate(4.25, Some(2)), 0.04);
        assert!((yield_to_rate(4.25, None) - 0.0425).abs() < 1e-12);
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_latest_close() {
        let client = YahooClient::new().unwrap();
        let close = client.get_latest_close("SPY").unwrap();

        assert!(close > 0.0);
        println!("SPY close: {}", close);
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_risk_free_rate() {
        let client = YahooClient::new().unwrap();
        let rate = client.get_risk_free_rate().unwrap();

        assert!(rate > 0.0 && rate < 0.2);
        println!("Risk-free rate: {}", rate);
    }
}
