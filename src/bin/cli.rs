//! Drift Hedge CLI
//!
//! Prompts for a ticker, strike and option type, then prints the forecast
//! diagnostics and the binomial hedge valuation.

use std::io::{self, BufRead, Write};

use drift_hedge::prelude::*;
use tracing_subscriber::EnvFilter;

/// Prints the diagnostics an analyst reads on the way to the valuation
struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_close_prices(&mut self, series: &PriceSeries, _rolling: &RollingStats) {
        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            println!("Close prices: {} observations, {} to {}", series.len(), first, last);
        }
    }

    fn on_stationarity(&mut self, report: &StationarityReport) {
        println!("\nAugmented Dickey-Fuller (detrended log series):");
        println!("  1. ADF Statistic : {:.6}", report.statistic);
        println!("  2. P-Value : {:.6}", report.p_value);
        println!("  3. Number of Lags : {}", report.used_lag);
        println!("  4. Number of Observations Used For ADF Regression: {}", report.n_obs);
        println!("  5. Critical Values :");
        for (label, value) in report.critical_values.entries() {
            println!("       {}: {:.6}", label, value);
        }
    }

    fn on_model(&mut self, summary: &ModelSummary) {
        println!(
            "\nARIMA(0,1,1) on {} observations over {} days ({} to {})",
            summary.n_obs, summary.n_days, summary.start, summary.end
        );
        println!("  ma.L1   : {:.6}", summary.theta);
        println!("  sigma2  : {:.6e}", summary.sigma2);
        println!("  log-lik : {:.4}", summary.log_likelihood);
        println!("  AIC     : {:.4}", summary.aic);
    }

    fn on_drift(&mut self, drift: &DriftEstimate) {
        println!(
            "\nLOG EQUATION: y = {:e} x + {:.6}",
            drift.trend.slope, drift.trend.intercept
        );
        println!("Drift over {} steps: {:.6}", drift.horizon, drift.value);
    }

    fn on_binomial_state(&mut self, state: &BinomialState) {
        println!("\ns_sub_u: {:.4}", state.up());
        println!("s_sub_d: {:.4}", state.down());
    }
}

fn prompt(input: &mut impl BufRead, message: &str) -> HedgeResult<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(HedgeError::invalid_input("no input provided"));
    }
    Ok(line.trim().to_string())
}

fn read_spec(input: &mut impl BufRead) -> HedgeResult<(String, OptionSpec)> {
    let ticker = prompt(input, "Enter the ticker symbol to analyze: ")?;
    if ticker.is_empty() {
        return Err(HedgeError::invalid_input("ticker symbol must not be empty"));
    }

    let strike_text = prompt(input, "Enter the strike price: ")?;
    let strike: f64 = strike_text
        .parse()
        .map_err(|_| HedgeError::invalid_input(format!("'{}' is not a number", strike_text)))?;

    let type_text = prompt(input, "Option type [call/put] (default call): ")?;
    let option_type = if type_text.is_empty() {
        OptionType::Call
    } else {
        type_text.parse()?
    };

    Ok((ticker, OptionSpec::new(option_type, strike)?))
}

fn run() -> HedgeResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let (ticker, spec) = read_spec(&mut input)?;

    let config = PipelineConfig::default();
    let provider = YahooClient::with_config(config.provider.clone())?;
    let pipeline = DriftPipeline::with_config(provider, config)?;

    let report = pipeline.value(&ticker, spec, &mut ConsoleObserver)?;
    let v = &report.valuation;

    println!("\n--- {} {} ---", report.analysis.symbol, v.option_type);
    println!("Strike Price: {}", v.strike);
    println!("Current Close: {:.4}", report.current_close);
    println!("Risk-Free Rate: {:.4}", report.risk_free_rate);
    println!("Intrinsic Value (up state): {:.4}", v.iv_up);
    println!("Intrinsic Value (down state): {:.4}", v.iv_down);
    println!("Delta: {:.6}", v.delta);
    println!("P_sub_c: {:.4}", v.portfolio_value);
    println!("Discounted premium: {:.4}", v.discounted_premium);
    println!("Option Value: {:.4}", v.fair_value);

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    println!("Drift Hedge Valuation");
    println!("=====================\n");

    if let Err(e) = run() {
        match &e {
            HedgeError::DegenerateState(_) | HedgeError::DivisionByZero(_) => {
                println!("Error calculating Delta: {}", e)
            }
            HedgeError::DataUnavailable(_) => {
                println!("Error: {}", e);
                println!("(This is expected if you're offline or Yahoo API is unavailable)");
            }
            _ => println!("Error: {}", e),
        }
    }
}
