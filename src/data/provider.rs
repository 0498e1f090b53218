//! Market data provider interface
//!
//! The pipeline never talks to the network directly; it is handed a
//! `MarketDataProvider`. `YahooClient` is the live implementation,
//! `StaticProvider` the deterministic one used in tests.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{HedgeError, HedgeResult, PriceFrame};

/// Source of price history, spot and risk-free rate
pub trait MarketDataProvider {
    /// Daily OHLC rows for `symbol` between `start` and `end` (inclusive)
    fn price_history(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> HedgeResult<PriceFrame>;

    /// Most recent close for `symbol`
    fn latest_close(&self, symbol: &str) -> HedgeResult<f64>;

    /// Risk-free rate as a decimal fraction (0.04 = 4%)
    fn risk_free_rate(&self) -> HedgeResult<f64>;
}

/// Network behaviour of live providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,
    /// Base backoff, doubled on every retry
    pub retry_backoff_ms: u64,
    /// Round the risk-free rate to this many decimals
    pub round_rate_to: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
            retry_backoff_ms: 500,
            round_rate_to: Some(2),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

/// Run `op`, retrying transient failures with exponential backoff.
///
/// Non-transient errors return immediately. Exhausted retries surface as
/// `DataUnavailable`.
pub fn with_retries<T>(
    config: &ProviderConfig,
    what: &str,
    mut op: impl FnMut() -> HedgeResult<T>,
) -> HedgeResult<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                let wait = config.backoff(attempt);
                tracing::warn!("{} failed ({}), retrying in {:?}", what, e, wait);
                std::thread::sleep(wait);
                attempt += 1;
            }
            Err(e) if e.is_transient() => {
                return Err(HedgeError::data_unavailable(format!(
                    "{} failed after {} attempts: {}",
                    what,
                    attempt + 1,
                    e
                )));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fixed in-memory provider
#[derive(Debug, Clone)]
pub struct StaticProvider {
    frame: PriceFrame,
    latest_close: Option<f64>,
    risk_free_rate: Option<f64>,
}

impl StaticProvider {
    pub fn new(frame: PriceFrame, latest_close: f64, risk_free_rate: f64) -> Self {
        Self {
            frame,
            latest_close: Some(latest_close),
            risk_free_rate: Some(risk_free_rate),
        }
    }

    /// Provider whose risk-free lookup fails
    pub fn without_rate(mut self) -> Self {
        self.risk_free_rate = None;
        self
    }

    /// Provider whose spot lookup fails
    pub fn without_close(mut self) -> Self {
        self.latest_close = None;
        self
    }
}

impl MarketDataProvider for StaticProvider {
    fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HedgeResult<PriceFrame> {
        if !self.frame.symbol.eq_ignore_ascii_case(symbol) {
            return Err(HedgeError::data_unavailable(format!(
                "no history for symbol {}",
                symbol
            )));
        }
        let bars = self
            .frame
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        Ok(PriceFrame::new(symbol, bars))
    }

    fn latest_close(&self, symbol: &str) -> HedgeResult<f64> {
        self.latest_close
            .ok_or_else(|| HedgeError::data_unavailable(format!("no quote for {}", symbol)))
    }

    fn risk_free_rate(&self) -> HedgeResult<f64> {
        self.risk_free_rate
            .ok_or_else(|| HedgeError::data_unavailable("could not resolve risk-free rate"))
    }
}
