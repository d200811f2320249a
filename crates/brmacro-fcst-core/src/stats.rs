//! Numeric helpers shared by the diagnostics, preprocessing and strategies.
//!
//! Every helper is total: degenerate inputs (too short, zero variance,
//! non-finite intermediates) produce `None` instead of NaN so callers can
//! decide how to degrade.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    finite(variance.sqrt())
}

/// Quantile of already sorted values using linear interpolation between
/// closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let idx = q * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        Some(sorted[sorted.len() - 1])
    } else {
        Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
    }
}

/// First and third quartile of unsorted values.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some((quantile_sorted(&sorted, 0.25)?, quantile_sorted(&sorted, 0.75)?))
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, 0.5)
}

/// Autocorrelation at `lag`: lagged autocovariance over the series variance,
/// both taken around the full-series mean.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || values.len() <= lag {
        return None;
    }
    let m = mean(values)?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &v) in values.iter().enumerate() {
        denominator += (v - m).powi(2);
        if i >= lag {
            numerator += (v - m) * (values[i - lag] - m);
        }
    }

    if denominator.abs() < f64::EPSILON {
        return None;
    }
    finite(numerator / denominator)
}

/// Pearson correlation between two equally long samples.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }

    if sxx.abs() < f64::EPSILON || syy.abs() < f64::EPSILON {
        return None;
    }
    finite(sxy / (sxx * syy).sqrt())
}

/// Ordinary least squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit against explicit abscissae.
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let mx = mean(x)?;
        let my = mean(y)?;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (a, b) in x.iter().zip(y.iter()) {
            sxy += (a - mx) * (b - my);
            sxx += (a - mx).powi(2);
        }
        if sxx.abs() < f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = my - slope * mx;
        if slope.is_finite() && intercept.is_finite() {
            Some(Self { slope, intercept })
        } else {
            None
        }
    }

    /// Fit against the integer index `0..values.len()`.
    pub fn fit_index(values: &[f64]) -> Option<Self> {
        let x = index_axis(values.len());
        Self::fit(&x, values)
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// `[0.0, 1.0, ..., n - 1]`.
pub fn index_axis(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0, epsilon = 1e-12);
        // Sample variance = 32 / 7
        assert_relative_eq!(
            sample_std(&values).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
        assert!(mean(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn test_quartiles_interpolate() {
        // Linear interpolation: Q1 at idx 0.75, Q3 at idx 2.25
        let (q1, q3) = quartiles(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_relative_eq!(q1, 1.75, epsilon = 1e-12);
        assert_relative_eq!(q3, 3.25, epsilon = 1e-12);
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_autocorrelation_periodic() {
        let values: Vec<f64> = (0..48)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let r12 = autocorrelation(&values, 12).unwrap();
        // 36 overlapping pairs out of 48
        assert_relative_eq!(r12, 0.75, epsilon = 1e-9);
        let r6 = autocorrelation(&values, 6).unwrap();
        assert!(r6 < -0.5);
    }

    #[test]
    fn test_autocorrelation_degenerate() {
        assert!(autocorrelation(&[5.0; 30], 12).is_none());
        assert!(autocorrelation(&[1.0, 2.0], 12).is_none());
        assert!(autocorrelation(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn test_pearson() {
        let x = index_axis(10);
        let y: Vec<f64> = x.iter().map(|v| 3.0 - 2.0 * v).collect();
        assert_relative_eq!(pearson(&x, &y).unwrap(), -1.0, epsilon = 1e-12);
        assert!(pearson(&x, &[1.0; 10]).is_none());
    }

    #[test]
    fn test_linear_fit() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + 0.5 * i as f64).collect();
        let fit = LinearFit::fit_index(&values).unwrap();
        assert_relative_eq!(fit.slope, 0.5, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 10.0, epsilon = 1e-12);
        assert_relative_eq!(fit.predict(20.0), 20.0, epsilon = 1e-12);
        assert!(LinearFit::fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }
}
