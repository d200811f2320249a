//! Forecast engine for Brazilian macroeconomic indicators.
//!
//! Given the history of one indicator (inflation, policy rate, exchange
//! rate, GDP, unemployment, fiscal balances), the engine cleans the series,
//! diagnoses trend and seasonality, selects a forecasting strategy and
//! returns 24 monthly point forecasts with confidence bounds and in-sample
//! fit metrics.
//!
//! ```
//! use brmacro_fcst_core::{ForecastConfig, ForecastEngine, ModelKind, RawObservation};
//! use chrono::NaiveDate;
//!
//! let history: Vec<RawObservation> = (0..36)
//!     .map(|i| {
//!         let date = NaiveDate::from_ymd_opt(2020 + i / 12, (i % 12) as u32 + 1, 1).unwrap();
//!         RawObservation::new(date, Some(10.0 + 0.5 * i as f64))
//!     })
//!     .collect();
//!
//! let engine = ForecastEngine::new(ForecastConfig::default());
//! let result = engine.forecast("selic", &history).unwrap();
//! assert_eq!(result.model_type(), ModelKind::Linear);
//! assert_eq!(result.forecast_values().len(), 24);
//! ```

pub mod config;
pub mod decomposition;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod imputation;
pub mod metrics;
pub mod preprocess;
pub mod quality;
pub mod selection;
pub mod series;
pub mod stats;
pub mod strategies;

// Re-exports for convenience
pub use config::{
    ForecastConfig, ModelOverrides, OverrideRule, DEFAULT_CONFIDENCE_LEVEL,
    DEFAULT_MIN_DATA_POINTS, POLICY_HORIZON_MONTHS,
};
pub use decomposition::{decompose_additive, ClassicalDecomposition};
pub use diagnostics::{detect_seasonality, detect_trend, volatility, SeriesDiagnostics};
pub use engine::{ForecastEngine, ForecastResult, ModelChoice, Stage};
pub use error::{ErrorCategory, ForecastError, Result};
pub use metrics::{score_fit, ModelPerformance};
pub use preprocess::{clean_values, preprocess};
pub use quality::{detect_statistical_outliers, validate_forecast_parameters, OutlierReport};
pub use selection::{select_model, ModelKind};
pub use series::{RawObservation, TimeSeriesPoint};
#[cfg(feature = "structural")]
pub use strategies::ChangepointForecaster;
pub use strategies::{StrategyOutput, StructuralForecaster};
