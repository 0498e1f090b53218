//! Stationarity transforms
//!
//! Log scaling, trailing rolling statistics, mean detrending and first
//! differencing of a close-price series. The detrended log series is what
//! the forecasting model is fitted on.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::core::{HedgeError, HedgeResult, PriceSeries, TimeSeries};

/// Default trailing window (observations)
pub const DEFAULT_WINDOW: usize = 12;

/// Trailing rolling mean and sample standard deviation.
///
/// Both series keep the input dates; the first `window - 1` entries are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub window: usize,
    pub mean: TimeSeries,
    pub std: TimeSeries,
}

impl RollingStats {
    pub fn compute(series: &TimeSeries, window: usize) -> HedgeResult<Self> {
        if window < 2 {
            return Err(HedgeError::invalid_input(format!(
                "rolling window must be at least 2, got {}",
                window
            )));
        }

        let n = series.len();
        let mut mean = vec![f64::NAN; n];
        let mut std = vec![f64::NAN; n];

        if n >= window {
            let values = series.to_array();
            for (i, w) in values.windows(window).into_iter().enumerate() {
                let end = i + window - 1;
                mean[end] = w.mean().unwrap_or(f64::NAN);
                std[end] = w.std(1.0);
            }
        }

        Ok(Self {
            window,
            mean: TimeSeries::new(series.dates().to_vec(), mean)?,
            std: TimeSeries::new(series.dates().to_vec(), std)?,
        })
    }

    /// Number of defined (non-NaN) entries
    pub fn defined_len(&self) -> usize {
        self.mean.values().iter().filter(|v| v.is_finite()).count()
    }
}

/// All derived series of one close-price history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedSeries {
    pub window: usize,
    /// Rolling statistics of the raw close
    pub close_rolling: RollingStats,
    /// ln(close)
    pub log: TimeSeries,
    /// Rolling statistics of the log series
    pub log_rolling: RollingStats,
    /// log - rolling mean, undefined leading entries dropped
    pub detrended: TimeSeries,
    /// Rolling statistics of the detrended series
    pub detrended_rolling: RollingStats,
    /// log[t] - log[t-1]
    pub first_difference: TimeSeries,
}

impl TransformedSeries {
    /// Detrended series, or `EmptyData` when the history was shorter than the window
    pub fn require_detrended(&self) -> HedgeResult<&TimeSeries> {
        if self.detrended.is_empty() {
            return Err(HedgeError::empty_data(format!(
                "detrended series is empty: need more than {} observations",
                self.window - 1
            )));
        }
        Ok(&self.detrended)
    }
}

/// Produces the log, rolling, detrended and differenced views of a series
#[derive(Debug, Clone, Copy)]
pub struct StationarityTransformer {
    window: usize,
}

impl Default for StationarityTransformer {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl StationarityTransformer {
    pub fn new(window: usize) -> HedgeResult<Self> {
        if window < 2 {
            return Err(HedgeError::invalid_input(format!(
                "rolling window must be at least 2, got {}",
                window
            )));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn transform(&self, prices: &PriceSeries) -> HedgeResult<TransformedSeries> {
        let log = log_transform(prices)?;
        let close_rolling = RollingStats::compute(prices, self.window)?;
        let log_rolling = RollingStats::compute(&log, self.window)?;
        let detrended = detrend(&log, &log_rolling.mean)?;
        let detrended_rolling = RollingStats::compute(&detrended, self.window)?;
        let first_difference = first_difference(&log)?;

        tracing::debug!(
            "Transformed {} prices: {} detrended, {} differenced",
            prices.len(),
            detrended.len(),
            first_difference.len()
        );

        Ok(TransformedSeries {
            window: self.window,
            close_rolling,
            log,
            log_rolling,
            detrended,
            detrended_rolling,
            first_difference,
        })
    }
}

/// Elementwise natural log; every price must be strictly positive
pub fn log_transform(prices: &PriceSeries) -> HedgeResult<TimeSeries> {
    if let Some((date, price)) = prices.iter().find(|(_, p)| !(p.is_finite() && *p > 0.0)) {
        return Err(HedgeError::invalid_input(format!(
            "cannot take log of price {} on {}",
            price, date
        )));
    }
    Ok(prices.map(f64::ln))
}

/// Subtract a rolling mean and drop the entries where it is undefined
pub fn detrend(series: &TimeSeries, rolling_mean: &TimeSeries) -> HedgeResult<TimeSeries> {
    if series.len() != rolling_mean.len() {
        return Err(HedgeError::invalid_input("rolling mean does not align with series"));
    }
    let diff: Array1<f64> = series.to_array() - rolling_mean.to_array();
    TimeSeries::new(series.dates().to_vec(), diff.to_vec()).map(|s| s.drop_non_finite())
}

/// `x[t] - x[t-1]`, dated at `t`
pub fn first_difference(series: &TimeSeries) -> HedgeResult<TimeSeries> {
    let values = series.values();
    TimeSeries::from_pairs(
        series
            .dates()
            .iter()
            .skip(1)
            .zip(values.windows(2))
            .map(|(&date, w)| (date, w[1] - w[0])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        TimeSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Duration::days(i as i64), v)),
        )
        .unwrap()
    }

    #[test]
    fn test_rolling_stats() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = RollingStats::compute(&s, 3).unwrap();

        assert!(stats.mean.values()[1].is_nan());
        assert_eq!(stats.mean.values()[2], 2.0);
        assert_eq!(stats.mean.values()[4], 4.0);
        // sample std of {1,2,3} is 1
        assert!((stats.std.values()[2] - 1.0).abs() < 1e-12);
        assert_eq!(stats.defined_len(), 3);
    }

    #[test]
    fn test_detrended_length() {
        let transformer = StationarityTransformer::default();
        for n in [12usize, 13, 40, 250] {
            let prices: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64).sin()).collect();
            let t = transformer.transform(&series(&prices)).unwrap();

            assert_eq!(t.log.len(), n);
            assert_eq!(t.detrended.len(), n - 11);
            assert_eq!(t.first_difference.len(), n - 1);
            assert_eq!(t.detrended.first_date(), Some(t.log.dates()[11]));
        }
    }

    #[test]
    fn test_short_history_yields_empty_detrended() {
        let transformer = StationarityTransformer::default();
        let prices: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();
        let t = transformer.transform(&series(&prices)).unwrap();

        assert!(t.detrended.is_empty());
        assert!(matches!(t.require_detrended(), Err(HedgeError::EmptyData(_))));
    }

    #[test]
    fn test_log_rejects_non_positive() {
        assert!(matches!(
            log_transform(&series(&[10.0, 0.0, 12.0])),
            Err(HedgeError::InvalidInput(_))
        ));
        assert!(log_transform(&series(&[10.0, -1.0])).is_err());
    }

    #[test]
    fn test_detrended_values() {
        let prices: Vec<f64> = (1..=14).map(|i| (i as f64).exp()).collect();
        let t = StationarityTransformer::new(3).unwrap().transform(&series(&prices)).unwrap();

        // log is 1..=14, each value sits one above its trailing 3-point mean
        assert_eq!(t.detrended.len(), 12);
        for v in t.detrended.values() {
            assert!((v - 1.0).abs() < 1e-9);
        }
        for v in t.first_difference.values() {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_window_validation() {
        assert!(StationarityTransformer::new(1).is_err());
        assert!(StationarityTransformer::new(2).is_ok());
    }
}
