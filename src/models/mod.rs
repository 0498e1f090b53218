//! Statistical models
//!
//! Implements:
//! - Stationarity transforms (log, rolling stats, detrending, differencing)
//! - Augmented Dickey-Fuller test (diagnostic)
//! - ACF/PACF correlogram (diagnostic)
//! - ARIMA(0,1,1) forecasting
//! - Trend line extraction (forecast -> drift)

pub mod adf;
pub mod arima;
pub mod correlogram;
pub mod stationarity;
pub mod trend;

pub use adf::*;
pub use arima::*;
pub use correlogram::*;
pub use stationarity::*;
pub use trend::*;
