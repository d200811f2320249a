//! Fit-quality metrics for the forecasting strategies.
//!
//! The primitives ([`mae`], [`rmse`], [`mape`], [`r2`]) are strict: they
//! reject empty or mismatched inputs. [`score_fit`] is the lenient entry point
//! used by the engine; it never fails and degrades to all-zero metrics.
//!
//! | Metric | Meaning |
//! |--------|---------|
//! | MAE | Average error in the series' own units |
//! | RMSE | Like MAE, penalising large errors more |
//! | MAPE | Average error as a percentage of the actual value |
//! | R² | Share of variance explained by the fitted values |

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound applied to MAPE when scoring a fit.
pub const MAPE_CAP: f64 = 1000.0;

/// In-sample fit quality of a strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub mae: f64,
    pub rmse: f64,
    /// Percentage, clamped to `[0, 1000]`
    pub mape: f64,
    pub r_squared: f64,
}

/// Mean Absolute Error.
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - fitted_i|
///
/// # Example
/// ```
/// use brmacro_fcst_core::metrics::mae;
/// let actual = vec![1.0, 2.0, 3.0];
/// let fitted = vec![1.1, 2.2, 2.8];
/// let error = mae(&actual, &fitted).unwrap();
/// assert!((error - 0.166).abs() < 0.01);
/// ```
pub fn mae(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    validate_inputs(actual, fitted)?;
    let sum: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root Mean Squared Error.
///
/// # Formula
/// RMSE = √[(1/n) * Σ(actual_i - fitted_i)²]
pub fn rmse(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    validate_inputs(actual, fitted)?;
    let sum: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Mean Absolute Percentage Error, in percent.
///
/// A zero actual with a non-zero fitted value contributes an infinite term,
/// so the result is `+inf`; an exact zero fit contributes nothing.
///
/// # Formula
/// MAPE = (100/n) * Σ|actual_i - fitted_i| / |actual_i|
pub fn mape(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    validate_inputs(actual, fitted)?;
    let sum: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| {
            if *a == 0.0 {
                if a == f {
                    0.0
                } else {
                    f64::INFINITY
                }
            } else {
                ((a - f) / a).abs()
            }
        })
        .sum();
    Ok(sum / actual.len() as f64 * 100.0)
}

/// Coefficient of determination. 0 when the actual values have no variance.
pub fn r2(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    validate_inputs(actual, fitted)?;

    let mean: f64 = actual.iter().sum::<f64>() / actual.len() as f64;

    let ss_res: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();

    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot.abs() < f64::EPSILON {
        return Ok(0.0);
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Score fitted values against the actual series.
///
/// Both slices are truncated to the shorter length. MAPE is clamped to
/// `[0, MAPE_CAP]` (NaN becomes 0). Any failure yields all-zero metrics and
/// a warning.
pub fn score_fit(actual: &[f64], fitted: &[f64]) -> ModelPerformance {
    let n = actual.len().min(fitted.len());
    match try_score(&actual[..n], &fitted[..n]) {
        Ok(performance) => performance,
        Err(e) => {
            tracing::warn!(error = %e, n, "fit scoring failed, reporting zero metrics");
            ModelPerformance::default()
        }
    }
}

fn try_score(actual: &[f64], fitted: &[f64]) -> Result<ModelPerformance> {
    let performance = ModelPerformance {
        mae: mae(actual, fitted)?,
        rmse: rmse(actual, fitted)?,
        mape: clamp_mape(mape(actual, fitted)?),
        r_squared: r2(actual, fitted)?,
    };
    if performance.mae.is_finite()
        && performance.rmse.is_finite()
        && performance.r_squared.is_finite()
    {
        Ok(performance)
    } else {
        Err(ForecastError::Computation(
            "non-finite fit metric".to_string(),
        ))
    }
}

fn clamp_mape(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAPE_CAP)
    }
}

fn validate_inputs(actual: &[f64], fitted: &[f64]) -> Result<()> {
    if actual.len() != fitted.len() {
        return Err(ForecastError::invalid_parameter(
            "fitted",
            fitted.len(),
            format!("length must match the {} actual values", actual.len()),
        ));
    }
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}
