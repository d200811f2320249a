//! Moving-average forecast: the mean of the most recent year, held flat.

use super::{StrategyOutput, Z_95};
use crate::error::{ForecastError, Result};
use crate::metrics::ModelPerformance;
use crate::stats::{mean, sample_std};

/// Longest averaging window.
pub const MAX_WINDOW: usize = 12;

/// Constant forecast at the mean of the last `min(12, n / 2)` values.
///
/// Bands are ±1.96 sample standard deviations of the whole series; the
/// reported fit quality is derived from that same deviation.
pub fn forecast(values: &[f64], horizon: usize) -> Result<StrategyOutput> {
    let n = values.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { needed: 2, got: n });
    }

    let window = MAX_WINDOW.min(n / 2);
    let level = mean(&values[n - window..])
        .ok_or_else(|| ForecastError::Computation("empty averaging window".to_string()))?;
    let sd = sample_std(values)
        .ok_or_else(|| ForecastError::Computation("undefined series deviation".to_string()))?;
    let series_mean = mean(values).unwrap_or(0.0);

    let mape = if series_mean == 0.0 {
        0.0
    } else {
        (sd / series_mean).abs() * 100.0
    };
    let performance = ModelPerformance {
        mae: sd,
        rmse: sd,
        mape,
        r_squared: 0.0,
    };

    StrategyOutput::with_margin(vec![level; horizon], Z_95 * sd, performance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_series_collapses_bounds() {
        let values = vec![5.5; 30];
        let out = forecast(&values, 24).unwrap();
        assert_eq!(out.len(), 24);
        for i in 0..24 {
            assert_relative_eq!(out.point[i], 5.5, epsilon = 1e-12);
            assert_relative_eq!(out.lower[i], 5.5, epsilon = 1e-12);
            assert_relative_eq!(out.upper[i], 5.5, epsilon = 1e-12);
        }
        assert_eq!(out.performance.mape, 0.0);
    }

    #[test]
    fn test_window_uses_recent_year() {
        let mut values = vec![0.0; 24];
        values.extend(vec![10.0; 12]);
        let out = forecast(&values, 3).unwrap();
        assert_relative_eq!(out.point[0], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_short_series_uses_half_window() {
        // n = 6 -> window 3 -> mean(4, 5, 6)
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = forecast(&values, 2).unwrap();
        assert_relative_eq!(out.point[1], 5.0, epsilon = 1e-12);
        let sd = sample_std(&values).unwrap();
        assert_relative_eq!(out.upper[0] - out.point[0], 1.96 * sd, epsilon = 1e-12);
        assert_relative_eq!(out.performance.rmse, sd, epsilon = 1e-12);
        assert_eq!(out.performance.r_squared, 0.0);
    }

    #[test]
    fn test_single_point_rejected() {
        assert!(matches!(
            forecast(&[1.0], 24),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
