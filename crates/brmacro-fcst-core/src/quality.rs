//! Data quality rules shared with the reporting side.
//!
//! The reporting fence ([`REPORTING_IQR_MULTIPLIER`]) is
//! narrower than the cleaning fence used by [`crate::preprocess`]: it flags
//! series worth a human look, it never changes data.

use crate::error::ForecastError;
use crate::preprocess::outlier_fence;

/// Fence width, in IQRs beyond Q1/Q3, for the outlier report.
pub const REPORTING_IQR_MULTIPLIER: f64 = 1.5;

/// Minimum number of observations before outliers are assessed at all.
pub const MIN_OBSERVATIONS_FOR_OUTLIERS: usize = 10;

/// Share of outliers (percent) above which a series is flagged.
pub const OUTLIER_PERCENTAGE_THRESHOLD: f64 = 5.0;

/// Largest horizon the engine accepts.
pub const MAX_HORIZON_MONTHS: usize = 60;

/// Accepted confidence level range (inclusive).
pub const CONFIDENCE_RANGE: (f64, f64) = (0.5, 0.99);

/// Outlier assessment for a single series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlierReport {
    /// Number of finite observations assessed
    pub n_observations: usize,
    /// Number of observations outside the reporting fence
    pub n_outliers: usize,
    /// `n_outliers` as a percentage of `n_observations`
    pub outlier_percentage: f64,
    /// Whether the share exceeds [`OUTLIER_PERCENTAGE_THRESHOLD`]
    pub flagged: bool,
}

impl OutlierReport {
    /// Human-readable warning when the series is flagged.
    pub fn warning(&self) -> Option<String> {
        self.flagged.then(|| {
            format!(
                "High share of outliers: {:.1}% ({} of {} observations)",
                self.outlier_percentage, self.n_outliers, self.n_observations
            )
        })
    }
}

/// Count observations outside `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
///
/// Nulls and non-finite values are ignored. Series shorter than
/// [`MIN_OBSERVATIONS_FOR_OUTLIERS`] are never flagged.
pub fn detect_statistical_outliers(values: &[Option<f64>]) -> OutlierReport {
    let clean: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect();
    let n = clean.len();

    if n < MIN_OBSERVATIONS_FOR_OUTLIERS {
        return OutlierReport {
            n_observations: n,
            ..Default::default()
        };
    }

    let Some((lower, upper)) = outlier_fence(&clean, REPORTING_IQR_MULTIPLIER) else {
        return OutlierReport {
            n_observations: n,
            ..Default::default()
        };
    };

    let n_outliers = clean.iter().filter(|&&v| v < lower || v > upper).count();
    let outlier_percentage = n_outliers as f64 / n as f64 * 100.0;

    OutlierReport {
        n_observations: n,
        n_outliers,
        outlier_percentage,
        flagged: outlier_percentage > OUTLIER_PERCENTAGE_THRESHOLD,
    }
}

/// Check forecast parameters against policy bounds.
///
/// Returns every violation found, not just the first one.
pub fn validate_forecast_parameters(
    horizon_months: usize,
    confidence_level: f64,
) -> std::result::Result<(), Vec<ForecastError>> {
    let mut errors = Vec::new();

    if horizon_months == 0 {
        errors.push(ForecastError::invalid_parameter(
            "horizon_months",
            horizon_months,
            "must be a positive number of months",
        ));
    } else if horizon_months > MAX_HORIZON_MONTHS {
        errors.push(ForecastError::invalid_parameter(
            "horizon_months",
            horizon_months,
            format!("must not exceed {} months", MAX_HORIZON_MONTHS),
        ));
    }

    let (lo, hi) = CONFIDENCE_RANGE;
    if !(lo..=hi).contains(&confidence_level) {
        errors.push(ForecastError::invalid_parameter(
            "confidence_level",
            confidence_level,
            format!("must be between {} and {}", lo, hi),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
