//! Error types for the forecast engine.

use thiserror::Error;

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types raised inside the engine.
///
/// None of these cross the orchestrator boundary: `ForecastEngine` logs them
/// and returns no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Empty series")]
    EmptySeries,

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    #[error("Structural forecaster is not available in this runtime")]
    StructuralUnavailable,

    #[error("Result invariant violated: {0}")]
    InvariantViolation(String),
}

/// Coarse classification used when logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed configuration or insufficient input, detected before any computation.
    InputValidation,
    /// Numerical failure inside a forecasting strategy.
    StrategyComputation,
}

impl ForecastError {
    /// Numeric code for the error, stable across releases.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::InvalidParameter { .. } => 1,
            ForecastError::InsufficientData { .. } => 2,
            ForecastError::EmptySeries => 3,
            ForecastError::Computation(_) => 4,
            ForecastError::Decomposition(_) => 5,
            ForecastError::StructuralUnavailable => 6,
            ForecastError::InvariantViolation(_) => 7,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::InvalidParameter { .. }
            | ForecastError::InsufficientData { .. }
            | ForecastError::EmptySeries => ErrorCategory::InputValidation,
            ForecastError::Computation(_)
            | ForecastError::Decomposition(_)
            | ForecastError::StructuralUnavailable
            | ForecastError::InvariantViolation(_) => ErrorCategory::StrategyComputation,
        }
    }

    pub(crate) fn invalid_parameter(
        param: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(
            ForecastError::invalid_parameter("horizon_months", 0, "must be positive").to_code(),
            1
        );
        assert_eq!(
            ForecastError::InsufficientData { needed: 24, got: 10 }.to_code(),
            2
        );
        assert_eq!(ForecastError::EmptySeries.to_code(), 3);
        assert_eq!(ForecastError::Computation("x".into()).to_code(), 4);
        assert_eq!(ForecastError::Decomposition("x".into()).to_code(), 5);
        assert_eq!(ForecastError::StructuralUnavailable.to_code(), 6);
        assert_eq!(ForecastError::InvariantViolation("x".into()).to_code(), 7);
    }

    #[test]
    fn test_error_display() {
        let err = ForecastError::InsufficientData { needed: 24, got: 10 };
        assert_eq!(
            format!("{}", err),
            "Insufficient data: need at least 24 observations, got 10"
        );

        let err = ForecastError::invalid_parameter(
            "confidence_level",
            1.2,
            "must be between 0.5 and 0.99",
        );
        assert_eq!(
            format!("{}", err),
            "Invalid parameter 'confidence_level' = '1.2': must be between 0.5 and 0.99"
        );

        let err = ForecastError::Decomposition("series too short".into());
        assert_eq!(format!("{}", err), "Decomposition failed: series too short");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ForecastError::EmptySeries.category(),
            ErrorCategory::InputValidation
        );
        assert_eq!(
            ForecastError::InsufficientData { needed: 2, got: 1 }.category(),
            ErrorCategory::InputValidation
        );
        assert_eq!(
            ForecastError::StructuralUnavailable.category(),
            ErrorCategory::StrategyComputation
        );
        assert_eq!(
            ForecastError::Computation("singular".into()).category(),
            ErrorCategory::StrategyComputation
        );
    }
}
