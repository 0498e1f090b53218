//! Forecast -> scalar drift
//!
//! A least-squares line is fitted through (step, mean) with steps 0..N-1 and
//! projected to the horizon: `drift = m·N + b`. The line is assumed to
//! describe the whole horizon; no goodness-of-fit check is made.

use serde::{Deserialize, Serialize};

use super::arima::ForecastResult;
use crate::core::{HedgeError, HedgeResult};

/// Slope and intercept of the forecast trend line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendParameters {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendParameters {
    /// Value of the line at `x`
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Projected drift and the horizon it was projected to.
///
/// The value is a fractional change over `horizon` steps; the valuation
/// stage reuses it as a one-period return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftEstimate {
    pub value: f64,
    pub horizon: usize,
    pub trend: TrendParameters,
}

impl DriftEstimate {
    /// Same trend line projected to another horizon
    pub fn reprojected(&self, horizon: usize) -> Self {
        Self {
            value: self.trend.at(horizon as f64),
            horizon,
            trend: self.trend,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendExtractor;

impl TrendExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Least-squares line through (step, mean)
    pub fn fit(&self, forecast: &ForecastResult) -> HedgeResult<TrendParameters> {
        fit_line(&forecast.means())
    }

    /// Fit, then project to the forecast's own horizon
    pub fn extract(&self, forecast: &ForecastResult) -> HedgeResult<DriftEstimate> {
        let trend = self.fit(forecast)?;
        let horizon = forecast.horizon();
        let drift = DriftEstimate {
            value: trend.at(horizon as f64),
            horizon,
            trend,
        };
        tracing::info!(
            "Trend y = {:.6e} x + {:.6}, drift over {} steps = {:.6}",
            trend.slope,
            trend.intercept,
            horizon,
            drift.value
        );
        Ok(drift)
    }
}

/// Ordinary least squares with x = 0..n-1
pub fn fit_line(y: &[f64]) -> HedgeResult<TrendParameters> {
    let n = y.len();
    if n < 2 {
        return Err(HedgeError::invalid_input(format!(
            "need at least 2 points to fit a line, got {}",
            n
        )));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(HedgeError::invalid_input("forecast contains non-finite values"));
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / nf;

    let (sxy, sxx) = y.iter().enumerate().fold((0.0, 0.0), |(sxy, sxx), (i, &yi)| {
        let dx = i as f64 - x_mean;
        (sxy + dx * (yi - y_mean), sxx + dx * dx)
    });

    let slope = sxy / sxx;
    Ok(TrendParameters {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}
