//! Classical additive decomposition.
//!
//! `value = trend + seasonal + residual`, where the trend is a centred moving
//! average over one full cycle and the seasonal component is the per-phase
//! mean of the detrended series, centred to zero.

use crate::error::{ForecastError, Result};

/// Cycle length of monthly data.
pub const MONTHLY_PERIOD: usize = 12;

/// Result of [`decompose_additive`].
///
/// `trend` and `residual` are NaN for the first and last `period / 2` points,
/// where the centred average is undefined.
#[derive(Debug, Clone)]
pub struct ClassicalDecomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
}

impl ClassicalDecomposition {
    /// Indices where the trend is defined.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.trend
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_finite())
            .map(|(i, _)| i)
    }

    /// One cycle of seasonal effects, aligned to the last `period`
    /// observations.
    pub fn last_cycle(&self) -> &[f64] {
        &self.seasonal[self.seasonal.len() - self.period..]
    }
}

/// Decompose `values` with the given cycle length.
///
/// Requires at least two full cycles and finite input.
pub fn decompose_additive(values: &[f64], period: usize) -> Result<ClassicalDecomposition> {
    if period < 2 {
        return Err(ForecastError::invalid_parameter(
            "period",
            period,
            "must be at least 2",
        ));
    }
    let n = values.len();
    if n < 2 * period {
        return Err(ForecastError::Decomposition(format!(
            "need two full cycles ({} observations), got {}",
            2 * period,
            n
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Decomposition(
            "series contains non-finite values".to_string(),
        ));
    }

    let trend = centered_moving_average(values, period);

    // Per-phase mean of the detrended values
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (v, t)) in values.iter().zip(trend.iter()).enumerate() {
        if t.is_finite() {
            sums[i % period] += v - t;
            counts[i % period] += 1;
        }
    }
    let mut phase_effects: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    let effect_mean = phase_effects.iter().sum::<f64>() / period as f64;
    for e in &mut phase_effects {
        *e -= effect_mean;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_effects[i % period]).collect();
    let residual: Vec<f64> = values
        .iter()
        .zip(trend.iter())
        .zip(seasonal.iter())
        .map(|((v, t), s)| v - t - s)
        .collect();

    Ok(ClassicalDecomposition {
        trend,
        seasonal,
        residual,
        period,
    })
}

/// Centred moving average spanning one cycle.
///
/// Even periods use the 2×period filter (half weight on both ends) so the
/// window stays centred.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &values[i - half..=i + half];
        *slot = if period % 2 == 0 {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            (inner + 0.5 * (window[0] + window[window.len() - 1])) / period as f64
        } else {
            window.iter().sum::<f64>() / period as f64
        };
    }
    trend
}
