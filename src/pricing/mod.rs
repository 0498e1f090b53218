//! Binomial hedge valuation
//!
//! - Binomial state: up/down prices around the forecast drift
//! - Valuation: intrinsic values, hedge ratio, discounted fair value

pub mod binomial;
pub mod valuation;

pub use binomial::*;
pub use valuation::*;
