//! Forecasting strategies.
//!
//! Every strategy maps a cleaned value series and a horizon to a
//! [`StrategyOutput`]: `horizon` point forecasts with lower/upper bounds, and
//! the in-sample fit quality. Dates are the engine's concern.

pub mod linear;
pub mod moving_average;
pub mod seasonal;
pub mod structural;

use crate::error::{ForecastError, Result};
use crate::metrics::ModelPerformance;
use crate::selection::ModelKind;

pub use structural::StructuralForecaster;
#[cfg(feature = "structural")]
pub use structural::ChangepointForecaster;

/// Normal quantile for the fixed 95% bands of the classical strategies.
pub const Z_95: f64 = 1.96;

/// Output of one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub performance: ModelPerformance,
}

impl StrategyOutput {
    /// Symmetric band of constant half-width around the point forecasts.
    pub(crate) fn with_margin(
        point: Vec<f64>,
        margin: f64,
        performance: ModelPerformance,
    ) -> Result<Self> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(ForecastError::Computation(format!(
                "invalid interval half-width {}",
                margin
            )));
        }
        let lower = point.iter().map(|p| p - margin).collect();
        let upper = point.iter().map(|p| p + margin).collect();
        Ok(Self {
            point,
            lower,
            upper,
            performance,
        })
    }

    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }
}

/// Run the strategy for `kind`.
///
/// `confidence_level` only affects the structural strategy; the classical
/// ones report fixed 95% bands.
pub fn run(
    kind: ModelKind,
    values: &[f64],
    horizon: usize,
    confidence_level: f64,
    structural: Option<&dyn StructuralForecaster>,
) -> Result<StrategyOutput> {
    if values.is_empty() {
        return Err(ForecastError::EmptySeries);
    }
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be positive",
        ));
    }
    match kind {
        ModelKind::MovingAverage => moving_average::forecast(values, horizon),
        ModelKind::Linear => linear::forecast(values, horizon),
        ModelKind::Seasonal => seasonal::forecast(values, horizon),
        ModelKind::Structural => structural
            .ok_or(ForecastError::StructuralUnavailable)?
            .forecast(values, horizon, confidence_level),
    }
}
