//! One-period replicating-portfolio valuation
//!
//! Intrinsic values at the two states give the hedge ratio; the hedged
//! portfolio's up-state value is discounted one year at the risk-free rate
//! and netted against the delta-weighted, drift-grown spot.

use serde::{Deserialize, Serialize};

use super::binomial::BinomialState;
use crate::core::{HedgeError, HedgeResult, OptionSpec, OptionType};

/// Everything the engine needs, already resolved
#[derive(Debug, Clone, Copy)]
pub struct ValuationInputs {
    pub state: BinomialState,
    pub current_close: f64,
    pub spec: OptionSpec,
    pub risk_free_rate: f64,
    /// Expected one-period return applied to the current close
    pub growth_drift: f64,
}

/// All intermediate and final values of one valuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub option_type: OptionType,
    pub strike: f64,
    pub up: f64,
    pub down: f64,
    pub iv_up: f64,
    pub iv_down: f64,
    pub delta: f64,
    /// Replicating portfolio value at the up state (P_c)
    pub portfolio_value: f64,
    /// P_c discounted one period (P)
    pub discounted_premium: f64,
    pub fair_value: f64,
    pub risk_free_rate: f64,
    pub growth_drift: f64,
}

/// Intrinsic values (up, down). Calls pay only in the up state, puts only in the down state.
pub fn intrinsic_values(state: &BinomialState, spec: &OptionSpec) -> (f64, f64) {
    let strike = spec.strike();
    match spec.option_type() {
        OptionType::Call => (OptionType::Call.intrinsic(state.up(), strike), 0.0),
        OptionType::Put => (0.0, OptionType::Put.intrinsic(state.down(), strike)),
    }
}

/// Hedge ratio across the two states
pub fn hedge_ratio(
    up: f64,
    down: f64,
    iv_up: f64,
    iv_down: f64,
    option_type: OptionType,
) -> HedgeResult<f64> {
    if up == down {
        return Err(HedgeError::division_by_zero(format!(
            "up and down prices are both {}",
            up
        )));
    }
    let delta = match option_type {
        OptionType::Call => (iv_down - iv_up) / (down - up),
        OptionType::Put => (iv_up - iv_down) / (down - up),
    };
    Ok(delta)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OptionValuationEngine;

impl OptionValuationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn value(&self, inputs: &ValuationInputs) -> HedgeResult<ValuationResult> {
        let ValuationInputs {
            state,
            current_close,
            spec,
            risk_free_rate,
            growth_drift,
        } = *inputs;

        if !risk_free_rate.is_finite() || risk_free_rate <= -1.0 {
            return Err(HedgeError::invalid_input(format!(
                "risk-free rate must be finite and above -100%, got {}",
                risk_free_rate
            )));
        }
        if !current_close.is_finite() || current_close <= 0.0 {
            return Err(HedgeError::invalid_input(format!(
                "current close must be positive, got {}",
                current_close
            )));
        }
        if !growth_drift.is_finite() {
            return Err(HedgeError::invalid_input("growth drift must be finite"));
        }

        let (up, down) = (state.up(), state.down());
        let (iv_up, iv_down) = intrinsic_values(&state, &spec);
        let delta = hedge_ratio(up, down, iv_up, iv_down, spec.option_type())?;

        let portfolio_value = -iv_up + delta * up;
        // WACC taken equal to the risk-free rate, one-year period
        let discounted_premium = portfolio_value / (1.0 + risk_free_rate);
        let fair_value = delta * (current_close * (1.0 + growth_drift)) - discounted_premium;

        tracing::info!(
            "Valued {} K={}: iv_up={:.4}, iv_down={:.4}, delta={:.4}, V={:.4}",
            spec.option_type(),
            spec.strike(),
            iv_up,
            iv_down,
            delta,
            fair_value
        );

        Ok(ValuationResult {
            option_type: spec.option_type(),
            strike: spec.strike(),
            up,
            down,
            iv_up,
            iv_down,
            delta,
            portfolio_value,
            discounted_premium,
            fair_value,
            risk_free_rate,
            growth_drift,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::binomial::BinomialStateBuilder;

    fn inputs(spec: OptionSpec, close: f64, drift: f64, rate: f64) -> ValuationInputs {
        ValuationInputs {
            state: BinomialStateBuilder::default().build(close, drift).unwrap(),
            current_close: close,
            spec,
            risk_free_rate: rate,
            growth_drift: drift,
        }
    }

    #[test]
    fn test_atm_call_scenario() {
        let result = OptionValuationEngine::new()
            .value(&inputs(OptionSpec::call(100.0).unwrap(), 100.0, 0.0, 0.04))
            .unwrap();

        assert!((result.up - 101.0).abs() < 1e-12);
        assert!((result.down - 99.0).abs() < 1e-12);
        assert!((result.iv_up - 1.0).abs() < 1e-9);
        assert_eq!(result.iv_down, 0.0);
        assert!((result.delta - 0.5).abs() < 1e-9);
        assert!((result.portfolio_value - 49.5).abs() < 1e-9);
        assert!((result.discounted_premium - 49.5 / 1.04).abs() < 1e-9);
        assert!((result.fair_value - (50.0 - 49.5 / 1.04)).abs() < 1e-9);
        assert!((result.fair_value - 2.4038).abs() < 1e-4);
    }

    #[test]
    fn test_put_scenario() {
        let result = OptionValuationEngine::new()
            .value(&inputs(OptionSpec::put(100.0).unwrap(), 100.0, 0.0, 0.04))
            .unwrap();

        assert_eq!(result.iv_up, 0.0);
        assert!((result.iv_down - 1.0).abs() < 1e-9);
        // (0 - 1) / (99 - 101)
        assert!((result.delta - 0.5).abs() < 1e-9);
        assert!((result.portfolio_value - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_intrinsic_invariants() {
        let builder = BinomialStateBuilder::default();
        for &(close, drift, strike) in &[(100.0, 0.05, 90.0), (100.0, -0.2, 110.0), (20.0, 0.3, 20.0)] {
            let state = builder.build(close, drift).unwrap();
            let (_, call_down) = intrinsic_values(&state, &OptionSpec::call(strike).unwrap());
            let (put_up, _) = intrinsic_values(&state, &OptionSpec::put(strike).unwrap());
            assert_eq!(call_down, 0.0);
            assert_eq!(put_up, 0.0);
        }
    }

    #[test]
    fn test_strike_monotonicity() {
        let state = BinomialStateBuilder::default().build(100.0, 0.02).unwrap();
        let mut last_call = f64::INFINITY;
        let mut last_put = f64::INFINITY;
        for k in 0..40 {
            let strike = 80.0 + k as f64;
            let (call_up, _) = intrinsic_values(&state, &OptionSpec::call(strike).unwrap());
            assert!(call_up <= last_call);
            last_call = call_up;

            let put_strike = 120.0 - k as f64;
            let (_, put_down) = intrinsic_values(&state, &OptionSpec::put(put_strike).unwrap());
            assert!(put_down <= last_put);
            last_put = put_down;
        }
    }

    #[test]
    fn test_delta_sign_conventions() {
        let builder = BinomialStateBuilder::default();
        for &(drift, strike) in &[(0.0, 100.0), (0.1, 105.0), (-0.1, 95.0), (0.004, 100.5)] {
            let state = builder.build(100.0, drift).unwrap();
            let call = OptionSpec::call(strike).unwrap();
            let put = OptionSpec::put(strike).unwrap();

            let (cu, cd) = intrinsic_values(&state, &call);
            let (pu, pd) = intrinsic_values(&state, &put);
            let call_delta = hedge_ratio(state.up(), state.down(), cu, cd, OptionType::Call).unwrap();
            let put_delta = hedge_ratio(state.up(), state.down(), pu, pd, OptionType::Put).unwrap();

            assert!(call_delta.is_finite() && put_delta.is_finite());
            // call: (iv_up - iv_down) / (up - down); put: the negated slope
            assert!((call_delta - (cu - cd) / state.width()).abs() < 1e-12);
            assert!((put_delta + (pu - pd) / state.width()).abs() < 1e-12);
            assert!(call_delta >= 0.0 && put_delta >= 0.0);
        }
    }

    #[test]
    fn test_division_by_zero_guard() {
        assert!(matches!(
            hedge_ratio(100.0, 100.0, 1.0, 0.0, OptionType::Call),
            Err(HedgeError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_rejects_bad_rate() {
        let mut i = inputs(OptionSpec::call(100.0).unwrap(), 100.0, 0.0, 0.04);
        i.risk_free_rate = -1.0;
        assert!(OptionValuationEngine::new().value(&i).is_err());
        i.risk_free_rate = f64::NAN;
        assert!(OptionValuationEngine::new().value(&i).is_err());
    }
}
