//! Price history data model
//!
//! - PriceBar / PriceFrame: raw OHLC rows as delivered by a provider
//! - TimeSeries: dated scalar series with strictly increasing dates

use chrono::NaiveDate;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::{HedgeError, HedgeResult};

/// One raw daily row. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// Bar with every field set to `close` (handy for stubs)
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(0),
        }
    }

    /// Close price when present and finite; the other fields are not consulted
    pub fn usable_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }
}

/// Raw price frame for one symbol
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceFrame {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceFrame {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Dated scalar series. Dates are strictly increasing and match values 1:1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Close-price series produced by preprocessing
pub type PriceSeries = TimeSeries;

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> HedgeResult<Self> {
        if dates.len() != values.len() {
            return Err(HedgeError::invalid_input(format!(
                "series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(HedgeError::invalid_input(format!(
                "series dates must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self { dates, values })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from an ordered iterator of (date, value) pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> HedgeResult<Self> {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Same dates, values mapped elementwise
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            dates: self.dates.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Keep only entries whose value is finite (drops leading NaNs of rolling stats)
    pub fn drop_non_finite(&self) -> Self {
        let (dates, values) = self.iter().filter(|(_, v)| v.is_finite()).unzip();
        Self { dates, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_rejects_unordered_dates() {
        assert!(TimeSeries::new(vec![d(2), d(1)], vec![1.0, 2.0]).is_err());
        assert!(TimeSeries::new(vec![d(1), d(1)], vec![1.0, 2.0]).is_err());
        assert!(TimeSeries::new(vec![d(1)], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_usable_close() {
        let mut bar = PriceBar::flat(d(1), 100.0);
        bar.open = None;
        bar.adj_close = None;
        bar.volume = None;
        assert_eq!(bar.usable_close(), Some(100.0));

        bar.close = Some(f64::NAN);
        assert_eq!(bar.usable_close(), None);
        bar.close = None;
        assert_eq!(bar.usable_close(), None);
    }
}
