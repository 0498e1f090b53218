//! Configuration for the drift/valuation pipeline

use serde::{Deserialize, Serialize};

use crate::core::{HedgeError, HedgeResult};
use crate::data::ProviderConfig;
use crate::models::{AdfConfig, DEFAULT_HORIZON, DEFAULT_WINDOW};
use crate::pricing::{DEFAULT_SPREAD, LEGACY_SPREAD};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rolling window for the stationarity transforms
    /// Default: 12
    pub window: usize,

    /// Forecast steps, and the horizon the trend line is projected to
    /// Default: 365
    pub horizon: usize,

    /// Spread added/subtracted around the drift for the up/down states
    /// Default: 0.01
    pub spread: f64,

    /// Days of history requested from the provider
    /// Default: 1095 (three years)
    pub history_days: i64,

    /// Coverage of the forecast bounds
    /// Default: 0.95
    pub confidence: f64,

    /// Lags reported in the correlogram
    /// Default: 40
    pub correlogram_lags: usize,

    /// Unit-root test settings
    pub adf: AdfConfig,

    /// Network behaviour of live providers
    pub provider: ProviderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
            spread: DEFAULT_SPREAD,
            history_days: 1095,
            confidence: 0.95,
            correlogram_lags: 40,
            adf: AdfConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// ±0.02 spread of the superseded first wiring, kept for comparison runs
    pub fn legacy() -> Self {
        Self {
            spread: LEGACY_SPREAD,
            ..Default::default()
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn validate(&self) -> HedgeResult<()> {
        if self.window < 2 {
            return Err(HedgeError::invalid_input("window must be at least 2"));
        }
        if self.horizon == 0 {
            return Err(HedgeError::invalid_input("horizon must be positive"));
        }
        if !self.spread.is_finite() || self.spread <= 0.0 {
            return Err(HedgeError::invalid_input(format!(
                "spread must be positive, got {}",
                self.spread
            )));
        }
        if self.history_days <= 0 {
            return Err(HedgeError::invalid_input("history_days must be positive"));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(HedgeError::invalid_input("confidence must lie in (0, 1)"));
        }
        Ok(())
    }
}
