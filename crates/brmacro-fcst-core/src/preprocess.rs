//! Series preprocessing: ordering, null removal and extreme-outlier repair.
//!
//! Outliers here are judged with a wide fence ([`CLEANING_IQR_MULTIPLIER`])
//! because the goal is a series the models can digest, not a statistical
//! report. The narrower reporting fence lives in [`crate::quality`].

use crate::imputation::interpolate_gaps;
use crate::series::{RawObservation, TimeSeriesPoint};
use crate::stats::quartiles;

/// Fence width, in IQRs beyond Q1/Q3, past which a value is rebuilt by
/// interpolation.
pub const CLEANING_IQR_MULTIPLIER: f64 = 3.0;

/// Clean a raw series.
///
/// Sorts by date (stable), drops null and non-finite values, keeps the last
/// supplied observation when a date repeats, then replaces values outside
/// `[Q1 - 3·IQR, Q3 + 3·IQR]` by linear interpolation between their
/// neighbours.
pub fn preprocess(raw: &[RawObservation]) -> Vec<TimeSeriesPoint> {
    let mut usable: Vec<TimeSeriesPoint> = raw
        .iter()
        .filter_map(|obs| match obs.value {
            Some(v) if v.is_finite() => Some(TimeSeriesPoint::new(obs.date, v)),
            _ => None,
        })
        .collect();
    usable.sort_by_key(|p| p.date);

    let mut series: Vec<TimeSeriesPoint> = Vec::with_capacity(usable.len());
    for point in usable {
        match series.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => series.push(point),
        }
    }

    let dropped = raw.len() - series.len();
    if dropped > 0 {
        tracing::debug!(dropped, "removed null, non-finite or duplicate observations");
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let cleaned = clean_values(&values);
    series
        .iter()
        .zip(cleaned)
        .map(|(p, v)| TimeSeriesPoint::new(p.date, v))
        .collect()
}

/// Replace extreme outliers in an ordered value series.
///
/// Returns the input unchanged when quartiles are undefined or when every
/// value would be flagged.
pub fn clean_values(values: &[f64]) -> Vec<f64> {
    let Some((lower, upper)) = outlier_fence(values, CLEANING_IQR_MULTIPLIER) else {
        return values.to_vec();
    };

    let masked: Vec<Option<f64>> = values
        .iter()
        .map(|&v| (lower..=upper).contains(&v).then_some(v))
        .collect();

    let n_outliers = masked.iter().filter(|v| v.is_none()).count();
    if n_outliers == 0 || n_outliers == values.len() {
        return values.to_vec();
    }

    tracing::debug!(n_outliers, lower, upper, "interpolated extreme outliers");
    interpolate_gaps(&masked)
}

/// `(Q1 - k·IQR, Q3 + k·IQR)` for the given multiplier `k`.
pub(crate) fn outlier_fence(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}
