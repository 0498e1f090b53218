//! Data fetching and cleaning
//!
//! Handles:
//! - The provider interface the pipeline depends on
//! - Yahoo Finance chart API (history, spot, ^TNX yield)
//! - Reduction of raw OHLC frames to close-price series

pub mod preprocess;
pub mod provider;
pub mod yahoo;

pub use preprocess::*;
pub use provider::*;
pub use yahoo::*;
