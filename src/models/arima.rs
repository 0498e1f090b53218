//! Integrated moving-average forecasting, ARIMA(0,1,1)
//!
//! ```text
//! Δy_t = ε_t + θ·ε_{t-1},   ε_t ~ N(0, σ²)
//! ```
//!
//! The model runs on a daily clock. Days without an observation (weekends,
//! holidays) are missing: an increment spanning k days is predicted by
//! `θ·ε_prev` with error variance `σ²·(1 + (k-1)(1+θ)²)`, and the shock at its
//! end is carried forward at its conditional mean. No residual is produced for
//! a missing day.
//!
//! θ is estimated by conditional least squares (zero pre-sample shock),
//! concentrating σ² out of the Gaussian likelihood, with Brent's method on
//! (-0.999, 0.999).
//!
//! Forecasts: every step has the same mean `y_T + θ·ε_T`; the h-step
//! variance is `σ²·(1 + (h-1)(1+θ)²)`.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::brent::BrentOpt;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

use crate::core::{HedgeError, HedgeResult, TimeSeries};

/// Fewest observed points the model is fitted on
pub const MIN_OBSERVATIONS: usize = 20;
/// Default forecast horizon (steps)
pub const DEFAULT_HORIZON: usize = 365;

const THETA_BOUND: f64 = 0.999;
const MAX_ITERS: u64 = 200;

/// Fitted model summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// MA(1) coefficient
    pub theta: f64,
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    /// Observed points
    pub n_obs: usize,
    /// Calendar days from first to last observation, inclusive
    pub n_days: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub iterations: u64,
}

/// One forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 0-based step index
    pub step: usize,
    pub date: NaiveDate,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// N-step forecast with confidence bounds, in detrended-log space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    /// Coverage of the bounds, e.g. 0.95
    pub confidence: f64,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }
}

/// Fitted ARIMA(0,1,1)
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub summary: ModelSummary,
    last_value: f64,
    last_residual: f64,
}

impl FittedModel {
    /// Forecast `steps` days past the end of the fitted series
    pub fn forecast(&self, steps: usize, confidence: f64) -> HedgeResult<ForecastResult> {
        if steps == 0 {
            return Err(HedgeError::invalid_input("forecast horizon must be positive"));
        }
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(HedgeError::invalid_input(format!(
                "confidence must lie in (0, 1), got {}",
                confidence
            )));
        }

        let normal = Normal::new(0.0, 1.0).map_err(|e| HedgeError::model_fit(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence / 2.0);

        let theta = self.summary.theta;
        let mean = self.last_value + theta * self.last_residual;
        let psi2 = (1.0 + theta) * (1.0 + theta);

        let points = (0..steps)
            .map(|step| {
                let var = self.summary.sigma2 * (1.0 + step as f64 * psi2);
                let half = z * var.sqrt();
                ForecastPoint {
                    step,
                    date: self.summary.end + Duration::days(step as i64 + 1),
                    mean,
                    lower: mean - half,
                    upper: mean + half,
                }
            })
            .collect();

        Ok(ForecastResult { points, confidence })
    }
}

/// Fits the model on the detrended log series
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn fit(&self, series: &TimeSeries) -> HedgeResult<FittedModel> {
        if series.is_empty() {
            return Err(HedgeError::empty_data("cannot fit a model to an empty series"));
        }
        if series.len() < MIN_OBSERVATIONS {
            return Err(HedgeError::model_fit(format!(
                "need at least {} observations, got {}",
                MIN_OBSERVATIONS,
                series.len()
            )));
        }

        let increments = daily_increments(series);
        let problem = MaObjective {
            increments: &increments,
        };

        let solver = BrentOpt::new(-THETA_BOUND, THETA_BOUND);
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(MAX_ITERS))
            .run()
            .map_err(|e| HedgeError::model_fit(format!("MA(1) solver failed: {}", e)))?;

        let state = result.state();
        let theta = state
            .get_best_param()
            .copied()
            .ok_or_else(|| HedgeError::model_fit("MA(1) solver returned no estimate"))?;
        let iterations = state.get_iter();

        let innovations = Innovations::compute(&increments, theta);
        let css = innovations.weighted_css();
        if !css.is_finite() || !theta.is_finite() {
            return Err(HedgeError::model_fit("MA(1) fit did not converge to a finite value"));
        }

        let m = increments.len() as f64;
        let sigma2 = css / m;
        if sigma2 <= 0.0 {
            return Err(HedgeError::model_fit("series has no variation after differencing"));
        }
        let log_likelihood =
            -0.5 * (m * ((2.0 * PI * sigma2).ln() + 1.0) + innovations.log_scale_sum());

        let (Some(start), Some(end), Some(last_value)) =
            (series.first_date(), series.last_date(), series.last_value())
        else {
            return Err(HedgeError::empty_data("series is empty"));
        };

        let summary = ModelSummary {
            theta,
            sigma2,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * 2.0,
            n_obs: series.len(),
            n_days: (end - start).num_days() as usize + 1,
            start,
            end,
            iterations,
        };

        tracing::info!(
            "Fitted ARIMA(0,1,1): theta={:.4}, sigma2={:.6}, n={} over {} days",
            summary.theta,
            summary.sigma2,
            summary.n_obs,
            summary.n_days
        );

        Ok(FittedModel {
            summary,
            last_value,
            last_residual: innovations.last_shock,
        })
    }
}

/// Change between consecutive observations and the calendar days it spans
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Increment {
    pub change: f64,
    pub days: usize,
}

/// Increments of a dated series on a daily clock; a k-day gap gives one
/// increment spanning k days
pub fn daily_increments(series: &TimeSeries) -> Vec<Increment> {
    series
        .dates()
        .windows(2)
        .zip(series.values().windows(2))
        .map(|(d, v)| Increment {
            change: v[1] - v[0],
            days: (d[1] - d[0]).num_days().max(1) as usize,
        })
        .collect()
}

/// Prediction errors of the MA(1) recursion, one per observed increment
#[derive(Debug, Clone, PartialEq)]
pub struct Innovations {
    /// Increment minus its prediction `θ·ε_prev`
    pub errors: Vec<f64>,
    /// Error variance in units of σ²
    pub scales: Vec<f64>,
    /// Shock estimate at the last observed day
    pub last_shock: f64,
}

impl Innovations {
    pub fn compute(increments: &[Increment], theta: f64) -> Self {
        let psi2 = (1.0 + theta) * (1.0 + theta);
        let mut errors = Vec::with_capacity(increments.len());
        let mut scales = Vec::with_capacity(increments.len());
        let mut shock = 0.0;

        for inc in increments {
            let error = inc.change - theta * shock;
            let scale = 1.0 + (inc.days - 1) as f64 * psi2;
            // E[ε_end | error]; equals the error itself for a one-day step
            shock = error / scale;
            errors.push(error);
            scales.push(scale);
        }

        Self {
            errors,
            scales,
            last_shock: shock,
        }
    }

    /// Σ e²/w
    pub fn weighted_css(&self) -> f64 {
        self.errors
            .iter()
            .zip(&self.scales)
            .map(|(e, w)| e * e / w)
            .sum()
    }

    /// Σ ln w
    pub fn log_scale_sum(&self) -> f64 {
        self.scales.iter().map(|w| w.ln()).sum()
    }

    /// -2·loglik up to constants, with σ² concentrated out
    fn profile_objective(&self) -> f64 {
        let m = self.errors.len() as f64;
        m * (self.weighted_css() / m).ln() + self.log_scale_sum()
    }
}

struct MaObjective<'a> {
    increments: &'a [Increment],
}

impl CostFunction for MaObjective<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, ArgminError> {
        let value = Innovations::compute(self.increments, *theta).profile_objective();
        if !value.is_finite() {
            return Err(
                HedgeError::model_fit(format!("non-finite objective at theta={}", theta)).into(),
            );
        }
        Ok(value)
    }
}
