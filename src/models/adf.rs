//! Augmented Dickey-Fuller unit-root test
//!
//! Regression with a constant:
//!
//! ```text
//! Δy_t = α + γ·y_{t-1} + Σ_{i=1..p} δ_i·Δy_{t-i} + ε_t
//! ```
//!
//! The statistic is the t-ratio of γ. The lag order p is chosen by an
//! information criterion over a common sample, then the regression is
//! refitted on all available observations. P-values use MacKinnon's (1994)
//! approximation, critical values his (2010) response surface.
//!
//! The report is diagnostic only. Nothing in the pipeline branches on it.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

use crate::core::{HedgeError, HedgeResult, TimeSeries};

// MacKinnon (1994), constant-only regression, one variable
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) response surface: c0 + c1/T + c2/T² + c3/T³
const CRIT_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Lag selection criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Autolag {
    Aic,
    Bic,
    /// Use the maximum lag as given
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdfConfig {
    /// Upper bound on augmentation lags; default `12·(n/100)^(1/4)`
    pub max_lag: Option<usize>,
    pub autolag: Autolag,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            autolag: Autolag::Aic,
        }
    }
}

/// Critical values of the test statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    pub fn for_nobs(nobs: usize) -> Self {
        let surface = |c: &[f64; 4]| {
            let inv = 1.0 / nobs as f64;
            c[0] + c[1] * inv + c[2] * inv * inv + c[3] * inv * inv * inv
        };
        Self {
            one_pct: surface(&CRIT_1PCT),
            five_pct: surface(&CRIT_5PCT),
            ten_pct: surface(&CRIT_10PCT),
        }
    }

    /// (label, value) pairs in the usual reporting order
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [("1%", self.one_pct), ("5%", self.five_pct), ("10%", self.ten_pct)]
    }
}

/// Result of an ADF test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationarityReport {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    /// Observations in the final regression
    pub n_obs: usize,
    pub critical_values: CriticalValues,
    /// Best information criterion value (None for `Autolag::Fixed`)
    pub ic_best: Option<f64>,
}

impl StationarityReport {
    /// Unit root rejected at the given level (0.01, 0.05, 0.10)
    pub fn rejects_unit_root(&self, level: f64) -> bool {
        self.p_value < level
    }
}

/// Run the test on a series
pub fn adf_test(series: &TimeSeries, config: &AdfConfig) -> HedgeResult<StationarityReport> {
    let x = series.values();
    let n = x.len();
    if n == 0 {
        return Err(HedgeError::empty_data("ADF test on empty series"));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(HedgeError::invalid_input("ADF test requires finite values"));
    }

    let default_lag = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    // one trend term (the constant)
    let cap = (n / 2).checked_sub(2).ok_or_else(|| {
        HedgeError::model_fit(format!("sample of {} is too short for the ADF test", n))
    })?;
    let max_lag = config.max_lag.unwrap_or(default_lag).min(cap);

    let (used_lag, ic_best) = match config.autolag {
        Autolag::Fixed => (max_lag, None),
        Autolag::Aic | Autolag::Bic => {
            let full = lag_design(x, max_lag, max_lag);
            let mut best: Option<(usize, f64)> = None;
            for lag in 0..=max_lag {
                let fit = ols(&full.y, &full.x.columns(0, 2 + lag).into_owned())?;
                let ic = match config.autolag {
                    Autolag::Bic => fit.bic(),
                    _ => fit.aic(),
                };
                if best.map_or(true, |(_, b)| ic < b) {
                    best = Some((lag, ic));
                }
            }
            let (lag, ic) = best.ok_or_else(|| HedgeError::model_fit("no ADF lag evaluated"))?;
            (lag, Some(ic))
        }
    };

    let design = lag_design(x, used_lag, used_lag);
    let fit = ols(&design.y, &design.x)?;
    // column 1 is the lagged level
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(HedgeError::model_fit("ADF statistic is not finite"));
    }

    let n_obs = design.y.len();
    let report = StationarityReport {
        statistic,
        p_value: mackinnon_p(statistic)?,
        used_lag,
        n_obs,
        critical_values: CriticalValues::for_nobs(n_obs),
        ic_best,
    };

    tracing::debug!(
        "ADF statistic {:.4}, p-value {:.4}, lags {}",
        report.statistic,
        report.p_value,
        report.used_lag
    );
    Ok(report)
}

/// Approximate p-value of the ADF statistic
pub fn mackinnon_p(stat: f64) -> HedgeResult<f64> {
    if stat > TAU_MAX {
        return Ok(1.0);
    }
    if stat < TAU_MIN {
        return Ok(0.0);
    }
    let z = if stat <= TAU_STAR {
        polyval(&TAU_SMALL_P, stat)
    } else {
        polyval(&TAU_LARGE_P, stat)
    };
    let normal = Normal::new(0.0, 1.0).map_err(|e| HedgeError::model_fit(e.to_string()))?;
    Ok(normal.cdf(z))
}

/// c[0] + c[1]·x + c[2]·x² + ...
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

struct Design {
    y: DVector<f64>,
    /// [1, y_{t-1}, Δy_{t-1}, ..., Δy_{t-lags}]
    x: DMatrix<f64>,
}

/// Regression rows for Δy_t with `lags` lagged differences, trimmed as if
/// `trim` lags were used so different lag orders share a sample.
fn lag_design(x: &[f64], lags: usize, trim: usize) -> Design {
    let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let rows: Vec<usize> = (trim..dx.len()).collect();

    let y = DVector::from_iterator(rows.len(), rows.iter().map(|&t| dx[t]));
    let design = DMatrix::from_fn(rows.len(), 2 + lags, |r, c| {
        let t = rows[r];
        match c {
            0 => 1.0,
            1 => x[t],
            k => dx[t - (k - 1)],
        }
    });

    Design { y, x: design }
}

struct OlsFit {
    beta: DVector<f64>,
    std_err: DVector<f64>,
    ssr: f64,
    nobs: usize,
    k: usize,
}

impl OlsFit {
    fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.k as f64
    }

    fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.nobs as f64).ln() * self.k as f64
    }

    fn t_value(&self, i: usize) -> f64 {
        self.beta[i] / self.std_err[i]
    }
}

fn ols(y: &DVector<f64>, x: &DMatrix<f64>) -> HedgeResult<OlsFit> {
    let (nobs, k) = x.shape();
    if nobs <= k {
        return Err(HedgeError::model_fit(format!(
            "regression has {} observations for {} regressors",
            nobs, k
        )));
    }

    let xt = x.transpose();
    let xtx_inv = (&xt * x)
        .try_inverse()
        .ok_or_else(|| HedgeError::model_fit("singular ADF design matrix"))?;
    let beta = &xtx_inv * (&xt * y);
    let resid = y - x * &beta;
    let ssr = resid.dot(&resid);
    let sigma2 = ssr / (nobs - k) as f64;
    let std_err = DVector::from_iterator(k, (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()));

    Ok(OlsFit {
        beta,
        std_err,
        ssr,
        nobs,
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn dated(values: Vec<f64>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        TimeSeries::from_pairs(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (start + Duration::days(i as i64), v)),
        )
        .unwrap()
    }

    fn noise(rng: &mut StdRng) -> f64 {
        // sum of uniforms: roughly normal, unit variance
        (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0
    }

    #[test]
    fn test_p_value_at_critical_value() {
        // 5% asymptotic critical value should map to p ≈ 0.05
        let p = mackinnon_p(-2.86154).unwrap();
        assert!((p - 0.05).abs() < 0.005, "p = {}", p);

        assert_eq!(mackinnon_p(3.0).unwrap(), 1.0);
        assert_eq!(mackinnon_p(-20.0).unwrap(), 0.0);

        let mid = mackinnon_p(-1.0).unwrap();
        assert!(mid > 0.6 && mid < 0.9);
    }

    #[test]
    fn test_critical_values_ordering() {
        let cv = CriticalValues::for_nobs(500);
        assert!(cv.one_pct < cv.five_pct && cv.five_pct < cv.ten_pct);
        assert!((cv.five_pct - (-2.8673)).abs() < 0.01);
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..400).map(|_| noise(&mut rng)).collect();
        let report = adf_test(&dated(values), &AdfConfig::default()).unwrap();

        assert!(report.statistic < report.critical_values.one_pct);
        assert!(report.rejects_unit_root(0.01));
        assert_eq!(report.n_obs, 400 - report.used_lag - 1);
    }

    #[test]
    fn test_random_walk_not_rejected() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut level = 0.0;
        let values: Vec<f64> = (0..400)
            .map(|_| {
                level += noise(&mut rng);
                level
            })
            .collect();
        let report = adf_test(&dated(values), &AdfConfig::default()).unwrap();

        assert!(report.p_value > 0.01);
        assert!((0.0..=1.0).contains(&report.p_value));
    }

    #[test]
    fn test_fixed_lag() {
        let mut rng = StdRng::seed_from_u64(3);
        let values: Vec<f64> = (0..200).map(|_| noise(&mut rng)).collect();
        let config = AdfConfig {
            max_lag: Some(4),
            autolag: Autolag::Fixed,
        };
        let report = adf_test(&dated(values), &config).unwrap();

        assert_eq!(report.used_lag, 4);
        assert_eq!(report.n_obs, 195);
        assert!(report.ic_best.is_none());
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            adf_test(&dated(vec![1.0, 2.0, 1.5]), &AdfConfig::default()),
            Err(HedgeError::ModelFit(_))
        ));
        assert!(matches!(
            adf_test(&TimeSeries::empty(), &AdfConfig::default()),
            Err(HedgeError::EmptyData(_))
        ));
    }
}
