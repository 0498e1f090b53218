//! Core data types for the drift/hedge pipeline
//!
//! Defines fundamental types:
//! - OptionType / OptionSpec: what is being valued
//! - PriceBar / PriceFrame / TimeSeries: price history
//! - HedgeError: the crate error

pub mod error;
pub mod option;
pub mod series;

pub use error::*;
pub use option::*;
pub use series::*;
