//! One-period, two-state price scenario
//!
//! up = P·(1 + d + s), down = P·(1 + d - s)

use serde::{Deserialize, Serialize};

use crate::core::{HedgeError, HedgeResult};

/// Default spread around the drift
pub const DEFAULT_SPREAD: f64 = 0.01;
/// Spread of the superseded first wiring of the model
pub const LEGACY_SPREAD: f64 = 0.02;

/// Up and down prices at the end of the period. `up != down` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinomialState {
    up: f64,
    down: f64,
}

impl BinomialState {
    pub fn new(up: f64, down: f64) -> HedgeResult<Self> {
        if !up.is_finite() || !down.is_finite() {
            return Err(HedgeError::invalid_input(format!(
                "binomial prices must be finite (up={}, down={})",
                up, down
            )));
        }
        if up == down {
            return Err(HedgeError::degenerate_state(format!(
                "up and down prices are both {}",
                up
            )));
        }
        Ok(Self { up, down })
    }

    pub fn up(&self) -> f64 {
        self.up
    }

    pub fn down(&self) -> f64 {
        self.down
    }

    /// up - down
    pub fn width(&self) -> f64 {
        self.up - self.down
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BinomialStateBuilder {
    spread: f64,
}

impl Default for BinomialStateBuilder {
    fn default() -> Self {
        Self {
            spread: DEFAULT_SPREAD,
        }
    }
}

impl BinomialStateBuilder {
    pub fn new(spread: f64) -> HedgeResult<Self> {
        if !spread.is_finite() {
            return Err(HedgeError::invalid_input(format!("spread must be finite, got {}", spread)));
        }
        Ok(Self { spread })
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Scenario around `close` for a fractional drift
    pub fn build(&self, close: f64, drift: f64) -> HedgeResult<BinomialState> {
        if !close.is_finite() || close <= 0.0 {
            return Err(HedgeError::invalid_input(format!(
                "current close must be positive, got {}",
                close
            )));
        }
        if !drift.is_finite() {
            return Err(HedgeError::invalid_input(format!("drift must be finite, got {}", drift)));
        }

        let state = BinomialState::new(
            close * (1.0 + drift + self.spread),
            close * (1.0 + drift - self.spread),
        )?;

        tracing::debug!(
            "Binomial state: up={:.4}, down={:.4} (close={}, drift={:.6}, spread={})",
            state.up,
            state.down,
            close,
            drift,
            self.spread
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state() {
        let state = BinomialStateBuilder::default().build(100.0, 0.0).unwrap();
        assert!((state.up() - 101.0).abs() < 1e-12);
        assert!((state.down() - 99.0).abs() < 1e-12);

        let state = BinomialStateBuilder::new(LEGACY_SPREAD).unwrap().build(50.0, 0.1).unwrap();
        assert!((state.up() - 56.0).abs() < 1e-12);
        assert!((state.down() - 54.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spread_is_degenerate() {
        let builder = BinomialStateBuilder::new(0.0).unwrap();
        assert!(matches!(
            builder.build(100.0, 0.0),
            Err(HedgeError::DegenerateState(_))
        ));
        assert!(matches!(
            BinomialState::new(5.0, 5.0),
            Err(HedgeError::DegenerateState(_))
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let builder = BinomialStateBuilder::default();
        assert!(builder.build(0.0, 0.0).is_err());
        assert!(builder.build(100.0, f64::NAN).is_err());
        assert!(BinomialStateBuilder::new(f64::INFINITY).is_err());
    }
}
