//! Structural forecasting capability.
//!
//! The engine only talks to [`StructuralForecaster`]; whether an
//! implementation exists is decided when the engine is built. The bundled
//! [`ChangepointForecaster`] (feature `structural`) fits
//!
//! ```text
//! y(t) = k + m·t + Σ δ_j (t - s_j)+ + Σ_k [a_k sin(2πk·i/P) + b_k cos(2πk·i/P)]
//! ```
//!
//! a piecewise-linear trend with changepoints `s_j` spread over the first 80%
//! of history plus a Fourier series for the yearly cycle, by ridge-penalised
//! least squares on max-abs scaled values.

use super::StrategyOutput;
use crate::error::Result;

/// A structural time-series model that produces per-step intervals.
pub trait StructuralForecaster: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Forecast `horizon` steps with bands at `confidence_level`.
    fn forecast(
        &self,
        values: &[f64],
        horizon: usize,
        confidence_level: f64,
    ) -> Result<StrategyOutput>;
}

#[cfg(feature = "structural")]
pub use changepoint::ChangepointForecaster;

#[cfg(feature = "structural")]
mod changepoint {
    use super::{StrategyOutput, StructuralForecaster};
    use crate::error::{ForecastError, Result};
    use crate::metrics::score_fit;
    use anofox_regression::prelude::*;
    use statrs::distribution::{ContinuousCDF, Normal};
    use std::f64::consts::PI;

    /// Piecewise-linear trend + Fourier seasonality model.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ChangepointForecaster {
        /// Upper bound on the number of trend changepoints
        pub max_changepoints: usize,
        /// Share of history, from the start, where changepoints may fall
        pub changepoint_range: f64,
        /// Prior scale of the trend rate changes; smaller is stiffer
        pub changepoint_prior_scale: f64,
        /// Prior scale of the Fourier coefficients
        pub seasonality_prior_scale: f64,
        /// Number of sine/cosine pairs
        pub fourier_order: usize,
        /// Seasonal period in observations
        pub period: usize,
    }

    impl Default for ChangepointForecaster {
        fn default() -> Self {
            Self {
                max_changepoints: 25,
                changepoint_range: 0.8,
                changepoint_prior_scale: 0.05,
                seasonality_prior_scale: 10.0,
                fourier_order: 5,
                period: 12,
            }
        }
    }

    /// Fitted model on the scaled problem.
    struct ScaledFit {
        coefficients: Vec<f64>,
        changepoints: Vec<f64>,
        sigma2: f64,
    }

    impl ChangepointForecaster {
        pub fn new() -> Self {
            Self::default()
        }

        /// Minimum series length: two seasonal cycles.
        pub fn min_observations(&self) -> usize {
            2 * self.period
        }

        fn validate(&self, n: usize, confidence_level: f64) -> Result<()> {
            if !(confidence_level > 0.0 && confidence_level < 1.0) {
                return Err(ForecastError::invalid_parameter(
                    "confidence_level",
                    confidence_level,
                    "must be strictly between 0 and 1",
                ));
            }
            if self.period < 2 || self.fourier_order == 0 || 2 * self.fourier_order > self.period
            {
                return Err(ForecastError::invalid_parameter(
                    "fourier_order",
                    self.fourier_order,
                    format!("must be between 1 and {}", self.period / 2),
                ));
            }
            if !(self.changepoint_prior_scale > 0.0 && self.seasonality_prior_scale > 0.0) {
                return Err(ForecastError::invalid_parameter(
                    "prior_scale",
                    self.changepoint_prior_scale.min(self.seasonality_prior_scale),
                    "must be positive",
                ));
            }
            let needed = self.min_observations();
            if n < needed {
                return Err(ForecastError::InsufficientData { needed, got: n });
            }
            Ok(())
        }

        /// Changepoint locations on the scaled time axis.
        pub(crate) fn changepoint_times(&self, t: &[f64]) -> Vec<f64> {
            let hist_size = ((t.len() as f64) * self.changepoint_range).floor() as usize;
            let count = self.max_changepoints.min(hist_size.saturating_sub(1));
            if count == 0 {
                return Vec::new();
            }
            let last = (hist_size - 1) as f64;
            (1..=count)
                .map(|j| {
                    let idx = (j as f64 * last / count as f64).round() as usize;
                    t[idx]
                })
                .collect()
        }

        /// Design row for scaled time `t` at observation index `i`.
        fn design_row(&self, t: f64, i: usize, changepoints: &[f64]) -> Vec<f64> {
            let mut row = Vec::with_capacity(2 + changepoints.len() + 2 * self.fourier_order);
            row.push(1.0);
            row.push(t);
            row.extend(changepoints.iter().map(|s| (t - s).max(0.0)));
            for k in 1..=self.fourier_order {
                let angle = 2.0 * PI * (k * i) as f64 / self.period as f64;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            row
        }

        /// Ridge penalty per design column.
        fn penalties(&self, n_changepoints: usize) -> Vec<f64> {
            let mut penalties = vec![0.0, 0.0];
            penalties.extend(std::iter::repeat_n(
                1.0 / self.changepoint_prior_scale,
                n_changepoints,
            ));
            penalties.extend(std::iter::repeat_n(
                1.0 / self.seasonality_prior_scale,
                2 * self.fourier_order,
            ));
            penalties
        }

        fn fit(&self, scaled: &[f64], t: &[f64]) -> Result<ScaledFit> {
            let n = scaled.len();
            let changepoints = self.changepoint_times(t);
            let penalties = self.penalties(changepoints.len());
            let k = penalties.len();

            // Observation rows followed by one penalty row per penalised column
            let mut rows: Vec<Vec<f64>> = (0..n)
                .map(|i| self.design_row(t[i], i, &changepoints))
                .collect();
            let mut target: Vec<f64> = scaled.to_vec();
            for (j, &lambda) in penalties.iter().enumerate().filter(|(_, l)| **l > 0.0) {
                let mut row = vec![0.0; k];
                row[j] = lambda.sqrt();
                rows.push(row);
                target.push(0.0);
            }

            let x_mat = faer::Mat::from_fn(rows.len(), k, |i, j| rows[i][j]);
            let y_col = faer::Col::from_fn(target.len(), |i| target[i]);

            let fitted = OlsRegressor::builder()
                .with_intercept(false)
                .build()
                .fit(&x_mat, &y_col)
                .map_err(|e| {
                    ForecastError::Computation(format!("structural fit failed: {:?}", e))
                })?;

            let coeffs_col = fitted.coefficients();
            let coefficients: Vec<f64> = (0..coeffs_col.nrows()).map(|i| coeffs_col[i]).collect();
            if coefficients.len() != k || coefficients.iter().any(|c| !c.is_finite()) {
                return Err(ForecastError::Computation(
                    "structural fit produced invalid coefficients".to_string(),
                ));
            }

            let sse: f64 = rows[..n]
                .iter()
                .zip(scaled.iter())
                .map(|(row, y)| (y - dot(row, &coefficients)).powi(2))
                .sum();
            let sigma2 = sse / n.saturating_sub(2).max(1) as f64;

            Ok(ScaledFit {
                coefficients,
                changepoints,
                sigma2,
            })
        }
    }

    impl StructuralForecaster for ChangepointForecaster {
        fn name(&self) -> &str {
            "changepoint"
        }

        fn forecast(
            &self,
            values: &[f64],
            horizon: usize,
            confidence_level: f64,
        ) -> Result<StrategyOutput> {
            let n = values.len();
            self.validate(n, confidence_level)?;
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::Computation(
                    "series contains non-finite values".to_string(),
                ));
            }

            let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
            let scaled: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

            let span = (n - 1) as f64;
            let t: Vec<f64> = (0..n).map(|i| i as f64 / span).collect();
            let fit = self.fit(&scaled, &t)?;

            let fitted: Vec<f64> = (0..n)
                .map(|i| {
                    dot(&self.design_row(t[i], i, &fit.changepoints), &fit.coefficients) * y_scale
                })
                .collect();

            let normal = Normal::new(0.0, 1.0)
                .map_err(|e| ForecastError::Computation(format!("normal distribution: {}", e)))?;
            let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);

            let t_mean = t.iter().sum::<f64>() / n as f64;
            let s_tt: f64 = t.iter().map(|x| (x - t_mean).powi(2)).sum();
            // Average size of a rate change, applied over the distance
            // travelled past the end of history
            let n_cp = fit.changepoints.len();
            let rate_drift = if n_cp == 0 {
                0.0
            } else {
                fit.coefficients[2..2 + n_cp].iter().map(|d| d.abs()).sum::<f64>() / n_cp as f64
            };

            let mut point = Vec::with_capacity(horizon);
            let mut lower = Vec::with_capacity(horizon);
            let mut upper = Vec::with_capacity(horizon);
            for h in 0..horizon {
                let i = n + h;
                let t_h = i as f64 / span;
                let yhat = dot(&self.design_row(t_h, i, &fit.changepoints), &fit.coefficients);
                let dt = t_h - 1.0;
                let variance = fit.sigma2 * (1.0 + 1.0 / n as f64 + (t_h - t_mean).powi(2) / s_tt)
                    + (rate_drift * dt).powi(2);
                let half_width = z * y_scale * variance.sqrt();
                if !(yhat.is_finite() && half_width.is_finite()) {
                    return Err(ForecastError::Computation(format!(
                        "non-finite structural forecast at step {}",
                        h
                    )));
                }
                point.push(yhat * y_scale);
                lower.push((yhat * y_scale) - half_width);
                upper.push((yhat * y_scale) + half_width);
            }

            tracing::debug!(
                model = self.name(),
                changepoints = n_cp,
                sigma2 = fit.sigma2,
                "structural model fitted"
            );

            Ok(StrategyOutput {
                point,
                lower,
                upper,
                performance: score_fit(values, &fitted),
            })
        }
    }

    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }
}
