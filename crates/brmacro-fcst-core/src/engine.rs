//! Forecast orchestration.
//!
//! A call runs through fixed stages:
//!
//! ```text
//! Validating -> Preprocessing -> Selecting -> Forecasting -> Scoring -> Done
//! ```
//!
//! Any stage may end in failure. Failures are logged with the indicator and
//! the stage and surface to the caller as `None`.

use crate::config::ForecastConfig;
use crate::diagnostics::SeriesDiagnostics;
use crate::error::{ErrorCategory, ForecastError, Result};
use crate::metrics::ModelPerformance;
use crate::preprocess::preprocess;
use crate::quality::validate_forecast_parameters;
use crate::selection::{select_model, ModelKind};
use crate::series::{monthly_dates_after, values_of, RawObservation};
use crate::strategies::{self, StrategyOutput, StructuralForecaster};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Which strategy a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelChoice {
    /// Let the selector decide from the series.
    #[default]
    Auto,
    /// Run this strategy, bypassing the selector.
    Fixed(ModelKind),
}

/// Processing stage of one forecast call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Preprocessing,
    Selecting,
    Forecasting,
    Scoring,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Preprocessing => "preprocessing",
            Stage::Selecting => "selecting",
            Stage::Forecasting => "forecasting",
            Stage::Scoring => "scoring",
            Stage::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed call: the stage it stopped in and why.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StageError {
    pub stage: Stage,
    pub error: ForecastError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|error| StageError { stage, error })
    }
}

/// Forecast for one indicator.
///
/// Every sequence has one entry per forecast month and
/// `lower_bound[i] <= forecast_values[i] <= upper_bound[i]` holds for each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    indicator_code: String,
    forecast_dates: Vec<NaiveDate>,
    forecast_values: Vec<f64>,
    lower_bound: Vec<f64>,
    upper_bound: Vec<f64>,
    confidence_level: f64,
    model_type: ModelKind,
    model_performance: ModelPerformance,
    created_at: DateTime<Utc>,
}

impl ForecastResult {
    /// Assemble a result, checking its invariants.
    fn assemble(
        indicator_code: &str,
        forecast_dates: Vec<NaiveDate>,
        output: StrategyOutput,
        confidence_level: f64,
        model_type: ModelKind,
        horizon: usize,
    ) -> Result<Self> {
        let StrategyOutput {
            point,
            lower,
            upper,
            performance,
        } = output;

        let lengths = [forecast_dates.len(), point.len(), lower.len(), upper.len()];
        if lengths.iter().any(|&len| len != horizon) {
            return Err(ForecastError::InvariantViolation(format!(
                "expected {} entries per sequence, got {:?}",
                horizon, lengths
            )));
        }
        if let Some(step) = (0..horizon).find(|&i| !(lower[i] <= point[i] && point[i] <= upper[i]))
        {
            return Err(ForecastError::InvariantViolation(format!(
                "bounds do not enclose the forecast at step {}: {} <= {} <= {}",
                step, lower[step], point[step], upper[step]
            )));
        }

        Ok(Self {
            indicator_code: indicator_code.to_string(),
            forecast_dates,
            forecast_values: point,
            lower_bound: lower,
            upper_bound: upper,
            confidence_level,
            model_type,
            model_performance: performance,
            created_at: Utc::now(),
        })
    }

    pub fn indicator_code(&self) -> &str {
        &self.indicator_code
    }

    pub fn forecast_dates(&self) -> &[NaiveDate] {
        &self.forecast_dates
    }

    pub fn forecast_values(&self) -> &[f64] {
        &self.forecast_values
    }

    pub fn lower_bound(&self) -> &[f64] {
        &self.lower_bound
    }

    pub fn upper_bound(&self) -> &[f64] {
        &self.upper_bound
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn model_type(&self) -> ModelKind {
        self.model_type
    }

    pub fn model_performance(&self) -> &ModelPerformance {
        &self.model_performance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of forecast months.
    pub fn horizon(&self) -> usize {
        self.forecast_values.len()
    }
}

/// Selects and runs a forecasting strategy per indicator.
///
/// Holds only immutable state; share it freely across threads.
#[derive(Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    structural: Option<Arc<dyn StructuralForecaster>>,
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("config", &self.config)
            .field("structural", &self.structural.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl ForecastEngine {
    /// Engine without a structural forecaster.
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            structural: None,
        }
    }

    /// Engine with the bundled changepoint model as structural forecaster.
    #[cfg(feature = "structural")]
    pub fn with_default_structural(config: ForecastConfig) -> Self {
        Self::new(config).with_structural(Arc::new(strategies::ChangepointForecaster::default()))
    }

    pub fn with_structural(mut self, forecaster: Arc<dyn StructuralForecaster>) -> Self {
        self.structural = Some(forecaster);
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn structural_available(&self) -> bool {
        self.structural.is_some()
    }

    /// Forecast with automatic model selection.
    pub fn forecast(&self, indicator: &str, raw: &[RawObservation]) -> Option<ForecastResult> {
        self.forecast_with(indicator, raw, ModelChoice::Auto)
    }

    /// Forecast with an explicit model choice.
    pub fn forecast_with(
        &self,
        indicator: &str,
        raw: &[RawObservation],
        choice: ModelChoice,
    ) -> Option<ForecastResult> {
        match self.try_forecast(indicator, raw, choice) {
            Ok(result) => {
                tracing::info!(
                    indicator,
                    model = %result.model_type(),
                    stage = %Stage::Done,
                    r_squared = result.model_performance().r_squared,
                    "forecast produced"
                );
                Some(result)
            }
            Err(StageError { stage, error }) => {
                match error.category() {
                    ErrorCategory::InputValidation => tracing::warn!(
                        indicator,
                        stage = %stage,
                        code = error.to_code(),
                        error = %error,
                        "forecast skipped"
                    ),
                    ErrorCategory::StrategyComputation => tracing::error!(
                        indicator,
                        stage = %stage,
                        code = error.to_code(),
                        error = %error,
                        "forecast failed"
                    ),
                }
                None
            }
        }
    }

    pub(crate) fn try_forecast(
        &self,
        indicator: &str,
        raw: &[RawObservation],
        choice: ModelChoice,
    ) -> std::result::Result<ForecastResult, StageError> {
        let horizon = self.config.horizon_months();
        let confidence_level = self.config.confidence_level();

        // Validating
        self.validate(raw, horizon, confidence_level)
            .at(Stage::Validating)?;

        // Preprocessing
        let series = preprocess(raw);
        let last_date = match series.last() {
            Some(point) => point.date,
            None => return Err(ForecastError::EmptySeries).at(Stage::Preprocessing),
        };
        let values = values_of(&series);

        // Selecting
        let model = match choice {
            ModelChoice::Fixed(kind) => {
                tracing::debug!(indicator, model = %kind, "explicit model choice");
                kind
            }
            ModelChoice::Auto => {
                let diagnostics = SeriesDiagnostics::analyze(&values);
                select_model(
                    indicator,
                    values.len(),
                    &diagnostics,
                    self.structural_available(),
                    self.config.overrides(),
                )
            }
        };

        // Forecasting
        let output = strategies::run(
            model,
            &values,
            horizon,
            confidence_level,
            self.structural.as_deref(),
        )
        .at(Stage::Forecasting)?;

        // Scoring
        let dates = monthly_dates_after(last_date, horizon);
        ForecastResult::assemble(indicator, dates, output, confidence_level, model, horizon)
            .at(Stage::Scoring)
    }

    fn validate(&self, raw: &[RawObservation], horizon: usize, confidence_level: f64) -> Result<()> {
        if let Err(mut errors) = validate_forecast_parameters(horizon, confidence_level) {
            return Err(errors.remove(0));
        }
        if raw.is_empty() {
            return Err(ForecastError::EmptySeries);
        }
        let usable = raw.iter().filter(|obs| obs.is_usable()).count();
        let needed = self.config.min_data_points();
        if usable < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: usable,
            });
        }
        Ok(())
    }
}
