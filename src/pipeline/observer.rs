//! Side-channel observers
//!
//! The pipeline hands intermediate results to an observer as it goes.
//! Observers cannot alter control flow: every hook returns `()`.

use crate::core::{PriceSeries, TimeSeries};
use crate::models::{
    Correlogram, DriftEstimate, ForecastResult, ModelSummary, RollingStats, StationarityReport,
};
use crate::pricing::{BinomialState, ValuationResult};

/// Receives intermediate series and results. All hooks default to no-ops.
pub trait PipelineObserver {
    fn on_close_prices(&mut self, _series: &PriceSeries, _rolling: &RollingStats) {}

    fn on_log_series(&mut self, _log: &TimeSeries, _rolling: &RollingStats) {}

    fn on_detrended(&mut self, _detrended: &TimeSeries, _rolling: &RollingStats) {}

    fn on_first_difference(&mut self, _diff: &TimeSeries) {}

    fn on_stationarity(&mut self, _report: &StationarityReport) {}

    fn on_correlogram(&mut self, _correlogram: &Correlogram) {}

    fn on_model(&mut self, _summary: &ModelSummary) {}

    fn on_forecast(&mut self, _history: &TimeSeries, _forecast: &ForecastResult) {}

    fn on_drift(&mut self, _drift: &DriftEstimate) {}

    fn on_binomial_state(&mut self, _state: &BinomialState) {}

    fn on_valuation(&mut self, _result: &ValuationResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

/// Logs a one-line summary of each stage through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_close_prices(&mut self, series: &PriceSeries, rolling: &RollingStats) {
        tracing::info!(
            "close: {} obs ({:?} to {:?}), last rolling mean {:.4}",
            series.len(),
            series.first_date(),
            series.last_date(),
            rolling.mean.last_value().unwrap_or(f64::NAN)
        );
    }

    fn on_detrended(&mut self, detrended: &TimeSeries, rolling: &RollingStats) {
        tracing::info!(
            "detrended: {} obs, last rolling std {:.6}",
            detrended.len(),
            rolling.std.last_value().unwrap_or(f64::NAN)
        );
    }

    fn on_stationarity(&mut self, report: &StationarityReport) {
        tracing::info!(
            "ADF statistic {:.4}, p-value {:.4}, lags {}, obs {}",
            report.statistic,
            report.p_value,
            report.used_lag,
            report.n_obs
        );
    }

    fn on_correlogram(&mut self, correlogram: &Correlogram) {
        tracing::debug!(
            "PACF lags outside ±{:.4}: {:?}",
            correlogram.band,
            correlogram.significant_pacf_lags()
        );
    }

    fn on_model(&mut self, summary: &ModelSummary) {
        tracing::info!(
            "ARIMA(0,1,1) theta={:.4} sigma2={:.6} aic={:.2}",
            summary.theta,
            summary.sigma2,
            summary.aic
        );
    }

    fn on_forecast(&mut self, _history: &TimeSeries, forecast: &ForecastResult) {
        if let (Some(first), Some(last)) = (forecast.points.first(), forecast.points.last()) {
            tracing::info!(
                "forecast {} steps: mean {:.6}, final band [{:.6}, {:.6}]",
                forecast.horizon(),
                first.mean,
                last.lower,
                last.upper
            );
        }
    }

    fn on_drift(&mut self, drift: &DriftEstimate) {
        tracing::info!("drift {:.6} over {} steps", drift.value, drift.horizon);
    }
}
