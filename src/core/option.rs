//! Option contract definitions
//!
//! The valuation only needs a type and a strike; expiry is fixed at one
//! period (one year) by the binomial model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{HedgeError, HedgeResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OptionType {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "calls" | "c" => Ok(OptionType::Call),
            "put" | "puts" | "p" => Ok(OptionType::Put),
            other => Err(HedgeError::invalid_input(format!(
                "unknown option type '{}', expected call or put",
                other
            ))),
        }
    }
}

/// Option specification: type and strike, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    option_type: OptionType,
    strike: f64,
}

impl OptionSpec {
    /// Create a new spec; the strike must be a positive finite number
    pub fn new(option_type: OptionType, strike: f64) -> HedgeResult<Self> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(HedgeError::invalid_input(format!(
                "strike must be a positive number, got {}",
                strike
            )));
        }
        Ok(Self { option_type, strike })
    }

    pub fn call(strike: f64) -> HedgeResult<Self> {
        Self::new(OptionType::Call, strike)
    }

    pub fn put(strike: f64) -> HedgeResult<Self> {
        Self::new(OptionType::Put, strike)
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Is this option in the money?
    pub fn is_itm(&self, spot: f64) -> bool {
        match self.option_type {
            OptionType::Call => spot > self.strike,
            OptionType::Put => spot < self.strike,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type() {
        assert_eq!(OptionType::Call.phi(), 1.0);
        assert_eq!(OptionType::Put.phi(), -1.0);

        assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.intrinsic(90.0, 100.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic(90.0, 100.0), 0.0);
    }

    #[test]
    fn test_parse_option_type() {
        assert_eq!("Call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" puts ".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!(matches!(
            "straddle".parse::<OptionType>(),
            Err(HedgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_spec_rejects_bad_strike() {
        assert!(OptionSpec::call(0.0).is_err());
        assert!(OptionSpec::put(-5.0).is_err());
        assert!(OptionSpec::call(f64::NAN).is_err());

        let spec = OptionSpec::put(95.0).unwrap();
        assert_eq!(spec.strike(), 95.0);
        assert!(spec.is_itm(90.0));
        assert!(!spec.is_itm(100.0));
    }
}
