//! Sample autocorrelation and partial autocorrelation
//!
//! Used to eyeball the MA/AR order of the detrended series. PACF comes
//! from the Durbin-Levinson recursion on the biased ACF.

use serde::{Deserialize, Serialize};

use crate::core::{HedgeError, HedgeResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlogram {
    /// acf[0] = 1
    pub acf: Vec<f64>,
    /// pacf[0] = 1
    pub pacf: Vec<f64>,
    /// Approximate 95% band for white noise, ±1.96/√n
    pub band: f64,
}

impl Correlogram {
    /// Compute up to `max_lags`. ACF is capped at n-1 lags, PACF at n/2 - 1.
    pub fn compute(values: &[f64], max_lags: usize) -> HedgeResult<Self> {
        let n = values.len();
        if n < 4 {
            return Err(HedgeError::empty_data(format!(
                "correlogram needs at least 4 observations, got {}",
                n
            )));
        }

        let acf = acf(values, max_lags.min(n - 1));
        if acf.iter().any(|v| !v.is_finite()) {
            return Err(HedgeError::invalid_input("series has zero variance"));
        }
        let pacf_lags = max_lags.min(n / 2 - 1);
        let pacf = durbin_levinson(&acf[..=pacf_lags]);

        Ok(Self {
            acf,
            pacf,
            band: 1.96 / (n as f64).sqrt(),
        })
    }

    /// Lags (≥ 1) whose PACF leaves the white-noise band
    pub fn significant_pacf_lags(&self) -> Vec<usize> {
        self.pacf
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, v)| v.abs() > self.band)
            .map(|(lag, _)| lag)
            .collect()
    }
}

/// r_k = Σ (x_t - x̄)(x_{t-k} - x̄) / Σ (x_t - x̄)²
pub fn acf(values: &[f64], nlags: usize) -> Vec<f64> {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let denom: f64 = centred.iter().map(|v| v * v).sum();

    (0..=nlags)
        .map(|k| {
            let num: f64 = centred[k..].iter().zip(&centred).map(|(a, b)| a * b).sum();
            num / denom
        })
        .collect()
}

fn durbin_levinson(acf: &[f64]) -> Vec<f64> {
    let nlags = acf.len() - 1;
    let mut pacf = vec![1.0; nlags + 1];
    let mut phi = vec![0.0; nlags + 1];
    let mut prev = vec![0.0; nlags + 1];
    let mut v: f64 = 1.0;

    for k in 1..=nlags {
        let num = acf[k] - (1..k).map(|j| prev[j] * acf[k - j]).sum::<f64>();
        let phi_kk = if v.abs() > 0.0 { num / v } else { 0.0 };
        phi[k] = phi_kk;
        for j in 1..k {
            phi[j] = prev[j] - phi_kk * prev[k - j];
        }
        v *= 1.0 - phi_kk * phi_kk;
        pacf[k] = phi_kk;
        prev[..=k].copy_from_slice(&phi[..=k]);
    }

    pacf
}
