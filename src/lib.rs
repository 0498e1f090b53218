//! # Drift Hedge - Forecast-Driven Binomial Option Valuation
//!
//! Estimates a price drift for a traded asset from its own history and uses
//! it to parameterize a one-period, two-state hedge valuation.
//!
//! ## Overview
//!
//! The pipeline:
//! - **Preprocessing**: raw OHLC rows reduced to a clean close series
//! - **Stationarity**: log scaling, 12-point rolling mean/std, detrending
//! - **Forecast**: ARIMA(0,1,1) on the detrended log series, 365 steps ahead
//! - **Trend**: least-squares line through the forecast, projected to the horizon
//! - **Binomial state**: up/down prices at drift ± spread
//! - **Valuation**: intrinsic values, hedge ratio, discounted fair value
//!
//! Market data comes through the [`data::MarketDataProvider`] trait, so the
//! whole chain runs offline against [`data::StaticProvider`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drift_hedge::prelude::*;
//!
//! let provider = YahooClient::new().unwrap();
//! let pipeline = DriftPipeline::new(provider);
//!
//! let spec = OptionSpec::call(500.0).unwrap();
//! let report = pipeline.value("SPY", spec, &mut TracingObserver).unwrap();
//!
//! println!("delta {:.4}, fair value {:.4}", report.valuation.delta, report.valuation.fair_value);
//! ```
//!
//! ## What This Model Does NOT Do
//!
//! - Multi-period (recombining) trees
//! - Volatility calibration of any kind
//! - Rescale the drift: the horizon-long trend value is used as a
//!   one-period return (see [`pipeline::DriftPipeline::price`])

pub mod core;
pub mod data;
pub mod models;
pub mod pipeline;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        HedgeError, HedgeResult, OptionSpec, OptionType, PriceBar, PriceFrame, PriceSeries,
        TimeSeries,
    };

    // Data fetching
    pub use crate::data::{
        MarketDataProvider, ProviderConfig, SeriesPreprocessor, StaticProvider, YahooClient,
    };

    // Models
    pub use crate::models::{
        adf_test, AdfConfig, Autolag, Correlogram, DriftEstimate, ForecastEngine,
        ForecastResult, ModelSummary, RollingStats, StationarityReport,
        StationarityTransformer, TransformedSeries, TrendExtractor, TrendParameters,
    };

    // Pricing
    pub use crate::pricing::{
        BinomialState, BinomialStateBuilder, OptionValuationEngine, ValuationInputs,
        ValuationResult,
    };

    // Pipeline
    pub use crate::pipeline::{
        DriftAnalysis, DriftPipeline, NullObserver, PipelineConfig, PipelineObserver,
        PipelineReport, TracingObserver,
    };
}

// Re-export main types at crate root
pub use crate::core::{HedgeError, HedgeResult};
pub use crate::pipeline::{DriftPipeline, PipelineConfig};
