//! DriftPipeline - main facade
//!
//! provider -> preprocess -> transform -> forecast -> trend (drift)
//!          -> binomial state -> valuation
//!
//! The ADF report and correlogram are computed on the way but never consulted.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::config::PipelineConfig;
use super::observer::PipelineObserver;
use crate::core::{HedgeError, HedgeResult, OptionSpec, PriceFrame, PriceSeries};
use crate::data::{MarketDataProvider, SeriesPreprocessor};
use crate::models::{
    adf_test, Correlogram, DriftEstimate, ForecastEngine, ForecastResult, ModelSummary,
    StationarityReport, StationarityTransformer, TransformedSeries, TrendExtractor,
};
use crate::pricing::{
    BinomialState, BinomialStateBuilder, OptionValuationEngine, ValuationInputs, ValuationResult,
};

/// Output of the forecasting half
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftAnalysis {
    pub symbol: String,
    pub prices: PriceSeries,
    pub transformed: TransformedSeries,
    /// None when the test could not be run on this sample
    pub stationarity: Option<StationarityReport>,
    pub correlogram: Option<Correlogram>,
    pub model: ModelSummary,
    pub forecast: ForecastResult,
    pub drift: DriftEstimate,
}

/// Full run: analysis plus valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub analysis: DriftAnalysis,
    pub current_close: f64,
    pub risk_free_rate: f64,
    pub state: BinomialState,
    pub valuation: ValuationResult,
}

/// Runs the full pipeline against an injected data provider
pub struct DriftPipeline<P: MarketDataProvider> {
    provider: P,
    config: PipelineConfig,
}

impl<P: MarketDataProvider> DriftPipeline<P> {
    /// Create a pipeline with default configuration
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: PipelineConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(provider: P, config: PipelineConfig) -> HedgeResult<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Default history range: `history_days` back from today
    pub fn default_range(&self) -> (NaiveDate, NaiveDate) {
        let end = Utc::now().date_naive();
        (end - Duration::days(self.config.history_days), end)
    }

    /// Value an option on `symbol` using the default history range
    pub fn value(
        &self,
        symbol: &str,
        spec: OptionSpec,
        observer: &mut dyn PipelineObserver,
    ) -> HedgeResult<PipelineReport> {
        let (start, end) = self.default_range();
        self.value_between(symbol, spec, start, end, observer)
    }

    /// Value an option on `symbol` using history between two dates
    pub fn value_between(
        &self,
        symbol: &str,
        spec: OptionSpec,
        start: NaiveDate,
        end: NaiveDate,
        observer: &mut dyn PipelineObserver,
    ) -> HedgeResult<PipelineReport> {
        let analysis = self.analyze(symbol, start, end, observer)?;

        let current_close = self
            .provider
            .latest_close(&analysis.symbol)
            .map_err(surface_provider_error)?;
        let risk_free_rate = self
            .provider
            .risk_free_rate()
            .map_err(surface_provider_error)?;
        tracing::info!(
            "{}: close {:.4}, risk-free rate {:.4}",
            analysis.symbol,
            current_close,
            risk_free_rate
        );

        let (state, valuation) =
            self.price(&analysis.drift, current_close, risk_free_rate, spec, observer)?;

        Ok(PipelineReport {
            analysis,
            current_close,
            risk_free_rate,
            state,
            valuation,
        })
    }

    /// Fetch history and run the forecasting half
    pub fn analyze(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        observer: &mut dyn PipelineObserver,
    ) -> HedgeResult<DriftAnalysis> {
        let symbol = validate_symbol(symbol)?;
        let frame = self
            .provider
            .price_history(&symbol, start, end)
            .map_err(surface_provider_error)?;
        self.analyze_frame(&frame, observer)
    }

    /// Forecasting half on an already fetched frame
    pub fn analyze_frame(
        &self,
        frame: &PriceFrame,
        observer: &mut dyn PipelineObserver,
    ) -> HedgeResult<DriftAnalysis> {
        let prices = SeriesPreprocessor::new().process(frame)?;

        let transformed = StationarityTransformer::new(self.config.window)?.transform(&prices)?;
        observer.on_close_prices(&prices, &transformed.close_rolling);
        observer.on_log_series(&transformed.log, &transformed.log_rolling);
        observer.on_detrended(&transformed.detrended, &transformed.detrended_rolling);
        observer.on_first_difference(&transformed.first_difference);

        let detrended = transformed.require_detrended()?;

        let stationarity = match adf_test(detrended, &self.config.adf) {
            Ok(report) => {
                observer.on_stationarity(&report);
                Some(report)
            }
            Err(e) => {
                tracing::warn!("Skipping ADF test: {}", e);
                None
            }
        };

        let correlogram = match Correlogram::compute(detrended.values(), self.config.correlogram_lags) {
            Ok(c) => {
                observer.on_correlogram(&c);
                Some(c)
            }
            Err(e) => {
                tracing::warn!("Skipping correlogram: {}", e);
                None
            }
        };

        let model = ForecastEngine::new().fit(detrended)?;
        observer.on_model(&model.summary);

        let forecast = model.forecast(self.config.horizon, self.config.confidence)?;
        observer.on_forecast(detrended, &forecast);

        let drift = TrendExtractor::new().extract(&forecast)?;
        observer.on_drift(&drift);

        Ok(DriftAnalysis {
            symbol: frame.symbol.clone(),
            prices,
            transformed,
            stationarity,
            correlogram,
            model: model.summary,
            forecast,
            drift,
        })
    }

    /// Valuation half. `drift.value` is used both for the binomial states and
    /// as the one-period growth of the current close; pass a reprojected
    /// estimate to change that scaling.
    pub fn price(
        &self,
        drift: &DriftEstimate,
        current_close: f64,
        risk_free_rate: f64,
        spec: OptionSpec,
        observer: &mut dyn PipelineObserver,
    ) -> HedgeResult<(BinomialState, ValuationResult)> {
        let state = BinomialStateBuilder::new(self.config.spread)?.build(current_close, drift.value)?;
        observer.on_binomial_state(&state);

        let valuation = OptionValuationEngine::new().value(&ValuationInputs {
            state,
            current_close,
            spec,
            risk_free_rate,
            growth_drift: drift.value,
        })?;
        observer.on_valuation(&valuation);

        Ok((state, valuation))
    }
}

fn validate_symbol(symbol: &str) -> HedgeResult<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(HedgeError::invalid_input("ticker symbol must not be empty"));
    }
    Ok(symbol.to_ascii_uppercase())
}

/// Every provider failure reaches the caller as `DataUnavailable`
fn surface_provider_error(e: HedgeError) -> HedgeError {
    match e {
        HedgeError::DataUnavailable(msg) | HedgeError::Network(msg) => {
            HedgeError::DataUnavailable(msg)
        }
        other => HedgeError::DataUnavailable(other.to_string()),
    }
}
