//! Statistical diagnostics used for model selection.
//!
//! All functions are total. When a statistic cannot be computed (short
//! series, zero variance, non-finite intermediates) the answer is "no
//! pattern detected".

use crate::stats::{autocorrelation, index_axis, mean, pearson, sample_std, LinearFit};

/// Seasonal lag for monthly data.
pub const SEASONAL_LAG: usize = 12;

/// Minimum observations (two full years) before seasonality is assessed.
pub const MIN_SEASONALITY_OBSERVATIONS: usize = 24;

/// Minimum observations before trend is assessed.
pub const MIN_TREND_OBSERVATIONS: usize = 12;

/// |ACF(12)| above which the series is considered seasonal.
pub const SEASONALITY_ACF_THRESHOLD: f64 = 0.3;

/// |Pearson r| above which an index/value relation counts as a trend.
pub const TREND_CORRELATION_THRESHOLD: f64 = 0.3;

/// |slope| per period above which a trend is considered material.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.01;

/// Whether the series shows yearly seasonality.
///
/// Uses the autocorrelation at lag 12 around the full-series mean.
pub fn detect_seasonality(values: &[f64]) -> bool {
    if values.len() < MIN_SEASONALITY_OBSERVATIONS {
        return false;
    }
    autocorrelation(values, SEASONAL_LAG)
        .map(|r| r.abs() > SEASONALITY_ACF_THRESHOLD)
        .unwrap_or(false)
}

/// Whether the series shows a linear trend.
///
/// Requires both a meaningful correlation with time and a non-negligible
/// OLS slope.
pub fn detect_trend(values: &[f64]) -> bool {
    if values.len() < MIN_TREND_OBSERVATIONS {
        return false;
    }
    let x = index_axis(values.len());
    let (Some(fit), Some(r)) = (LinearFit::fit(&x, values), pearson(&x, values)) else {
        return false;
    };
    r.abs() > TREND_CORRELATION_THRESHOLD && fit.slope.abs() > TREND_SLOPE_THRESHOLD
}

/// Coefficient of variation (sample std over mean); 0 when undefined.
pub fn volatility(values: &[f64]) -> f64 {
    match (sample_std(values), mean(values)) {
        (Some(sd), Some(m)) if m != 0.0 => {
            let cv = sd / m;
            if cv.is_finite() {
                cv
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Diagnostics of one cleaned series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesDiagnostics {
    pub has_seasonality: bool,
    pub has_trend: bool,
    pub volatility: f64,
}

impl SeriesDiagnostics {
    pub fn analyze(values: &[f64]) -> Self {
        Self {
            has_seasonality: detect_seasonality(values),
            has_trend: detect_trend(values),
            volatility: volatility(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn seasonal_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let trend = 100.0 + 20.0 * i as f64 / (n - 1) as f64;
                let season = 5.0 * (2.0 * PI * i as f64 / 12.0).sin();
                let noise = ((i * 7 + 3) % 11) as f64 * 0.1 - 0.5;
                trend + season + noise
            })
            .collect()
    }

    #[test]
    fn test_detect_seasonality() {
        assert!(detect_seasonality(&seasonal_series(60)));
    }

    #[test]
    fn test_seasonality_needs_two_years() {
        let values = seasonal_series(23);
        assert!(!detect_seasonality(&values));
    }

    #[test]
    fn test_linear_ramp_is_not_seasonal() {
        let values: Vec<f64> = (0..36).map(|i| 5.0 + 0.5 * i as f64).collect();
        assert!(!detect_seasonality(&values));
        assert!(detect_trend(&values));
    }

    #[test]
    fn test_flat_series_has_no_pattern() {
        let values = vec![7.25; 36];
        assert!(!detect_seasonality(&values));
        assert!(!detect_trend(&values));
        assert_eq!(volatility(&values), 0.0);
    }

    #[test]
    fn test_tiny_slope_is_not_a_trend() {
        let values: Vec<f64> = (0..36).map(|i| 1.0 + 0.001 * i as f64).collect();
        assert!(!detect_trend(&values));
    }

    #[test]
    fn test_trend_needs_twelve_points() {
        let values: Vec<f64> = (0..11).map(|i| i as f64).collect();
        assert!(!detect_trend(&values));
    }

    #[test]
    fn test_non_finite_values_do_not_panic() {
        let mut values = seasonal_series(36);
        values[3] = f64::NAN;
        assert!(!detect_seasonality(&values));
        assert!(!detect_trend(&values));
    }

    #[test]
    fn test_volatility() {
        let values = vec![9.0, 11.0, 9.0, 11.0];
        let expected = (4.0_f64 / 3.0).sqrt() / 10.0;
        assert_relative_eq!(volatility(&values), expected, epsilon = 1e-12);
        assert_eq!(volatility(&[-1.0, 1.0]), 0.0);
    }
}
