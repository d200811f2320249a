//! Linear-trend forecast.

use super::{StrategyOutput, Z_95};
use crate::error::{ForecastError, Result};
use crate::metrics::{rmse, score_fit};
use crate::stats::LinearFit;

/// Extend an OLS line fitted against the observation index.
///
/// Bands are ±1.96 × in-sample RMSE.
pub fn forecast(values: &[f64], horizon: usize) -> Result<StrategyOutput> {
    let n = values.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { needed: 2, got: n });
    }
    let line = LinearFit::fit_index(values)
        .ok_or_else(|| ForecastError::Computation("linear trend fit failed".to_string()))?;

    let fitted: Vec<f64> = (0..n).map(|i| line.predict(i as f64)).collect();
    let point: Vec<f64> = (n..n + horizon).map(|i| line.predict(i as f64)).collect();
    let margin = Z_95 * rmse(values, &fitted)?;

    StrategyOutput::with_margin(point, margin, score_fit(values, &fitted))
}
