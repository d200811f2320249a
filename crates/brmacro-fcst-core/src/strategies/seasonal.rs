//! Seasonal-decomposition forecast.
//!
//! Decomposes the series into trend, a 12-month seasonal profile and
//! residual, then projects: trend line + repeating seasonal profile.

use super::{StrategyOutput, Z_95};
use crate::decomposition::{decompose_additive, MONTHLY_PERIOD};
use crate::error::{ForecastError, Result};
use crate::metrics::score_fit;
use crate::stats::{sample_std, LinearFit};

/// Minimum series length: two full cycles.
pub const MIN_OBSERVATIONS: usize = 2 * MONTHLY_PERIOD;

pub fn forecast(values: &[f64], horizon: usize) -> Result<StrategyOutput> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: n,
        });
    }
    let decomposition = decompose_additive(values, MONTHLY_PERIOD)?;

    // Trend line fitted on the defined trend points at their own positions,
    // so the extension continues from index n.
    let valid: Vec<usize> = decomposition.valid_indices().collect();
    let x: Vec<f64> = valid.iter().map(|&i| i as f64).collect();
    let y: Vec<f64> = valid.iter().map(|&i| decomposition.trend[i]).collect();
    let trend_line = LinearFit::fit(&x, &y)
        .ok_or_else(|| ForecastError::Decomposition("trend extrapolation failed".to_string()))?;

    let cycle = decomposition.last_cycle();
    let point: Vec<f64> = (0..horizon)
        .map(|h| trend_line.predict((n + h) as f64) + cycle[h % MONTHLY_PERIOD])
        .collect();

    let residuals: Vec<f64> = decomposition
        .residual
        .iter()
        .copied()
        .filter(|r| r.is_finite())
        .collect();
    let resid_sd = sample_std(&residuals)
        .ok_or_else(|| ForecastError::Decomposition("undefined residual spread".to_string()))?;

    let actual: Vec<f64> = valid.iter().map(|&i| values[i]).collect();
    let fitted: Vec<f64> = valid
        .iter()
        .map(|&i| decomposition.trend[i] + decomposition.seasonal[i])
        .collect();

    StrategyOutput::with_margin(point, Z_95 * resid_sd, score_fit(&actual, &fitted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn seasonal(i: usize) -> f64 {
        4.0 * (2.0 * PI * i as f64 / 12.0).sin()
    }

    #[test]
    fn test_projects_trend_and_season() {
        let n = 60;
        let values: Vec<f64> = (0..n).map(|i| 50.0 + 0.2 * i as f64 + seasonal(i)).collect();
        let out = forecast(&values, 24).unwrap();
        assert_eq!(out.len(), 24);
        for h in 0..24 {
            let expected = 50.0 + 0.2 * (n + h) as f64 + seasonal(n + h);
            assert_relative_eq!(out.point[h], expected, epsilon = 1e-6);
        }
        assert_relative_eq!(out.performance.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_is_phase_aligned_for_partial_years() {
        // 30 observations: the first forecast month has phase 6
        let values: Vec<f64> = (0..30).map(|i| 10.0 + seasonal(i)).collect();
        let out = forecast(&values, 12).unwrap();
        for h in 0..12 {
            assert_relative_eq!(out.point[h], 10.0 + seasonal(30 + h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bounds_enclose_forecast() {
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 + seasonal(i) + ((i * 5 + 1) % 7) as f64 * 0.3)
            .collect();
        let out = forecast(&values, 24).unwrap();
        for h in 0..24 {
            assert!(out.lower[h] < out.point[h]);
            assert!(out.point[h] < out.upper[h]);
        }
    }

    #[test]
    fn test_needs_two_years() {
        let values = vec![1.0; 23];
        assert!(matches!(
            forecast(&values, 24),
            Err(ForecastError::InsufficientData { needed: 24, got: 23 })
        ));
    }
}
