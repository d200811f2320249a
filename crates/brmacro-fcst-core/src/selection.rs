//! Model kinds and the selection policy.

use crate::config::ModelOverrides;
use crate::diagnostics::SeriesDiagnostics;
use crate::error::ForecastError;
use serde::{Deserialize, Serialize};

/// Series length from which the structural model is chosen on statistical
/// grounds alone (four years of monthly data).
pub const MIN_STRUCTURAL_OBSERVATIONS: usize = 48;

/// Series length from which seasonal decomposition is chosen.
pub const MIN_SEASONAL_OBSERVATIONS: usize = 24;

/// Forecasting strategies the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Additive trend + 12-period seasonal decomposition
    Seasonal,
    /// OLS trend line
    Linear,
    /// Recent-window mean
    MovingAverage,
    /// Changepoint trend + Fourier seasonality with per-step intervals
    Structural,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Seasonal => "seasonal",
            ModelKind::Linear => "linear",
            ModelKind::MovingAverage => "moving_average",
            ModelKind::Structural => "structural",
        }
    }

    /// All kinds, in selection-priority order of the statistical rules.
    pub fn all() -> [ModelKind; 4] {
        [
            ModelKind::Structural,
            ModelKind::Seasonal,
            ModelKind::Linear,
            ModelKind::MovingAverage,
        ]
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seasonal" | "seasonal_decomposition" => Ok(ModelKind::Seasonal),
            "linear" | "linear_trend" => Ok(ModelKind::Linear),
            "moving_average" | "movingaverage" | "ma" => Ok(ModelKind::MovingAverage),
            "structural" | "prophet" => Ok(ModelKind::Structural),
            other => Err(ForecastError::invalid_parameter(
                "model_type",
                other,
                "expected one of seasonal, linear, moving_average, structural",
            )),
        }
    }
}

/// Pick a model for one series. First matching rule wins:
///
/// 1. indicator override table
/// 2. structural available, n >= 48 and seasonal -> structural
/// 3. seasonal and n >= 24 -> seasonal decomposition
/// 4. trend -> linear
/// 5. moving average
pub fn select_model(
    indicator: &str,
    n_observations: usize,
    diagnostics: &SeriesDiagnostics,
    structural_available: bool,
    overrides: &ModelOverrides,
) -> ModelKind {
    if let Some(rule) = overrides.rule_for(indicator) {
        let feasible = rule.preferred != ModelKind::Structural || structural_available;
        let chosen = if feasible && n_observations >= rule.min_length {
            rule.preferred
        } else {
            rule.fallback
        };
        if chosen == rule.preferred {
            tracing::info!(indicator, model = %chosen, "indicator override selected preferred model");
        } else {
            tracing::warn!(
                indicator,
                preferred = %rule.preferred,
                model = %chosen,
                n_observations,
                "indicator override fell back"
            );
        }
        return chosen;
    }

    let chosen = if structural_available
        && n_observations >= MIN_STRUCTURAL_OBSERVATIONS
        && diagnostics.has_seasonality
    {
        ModelKind::Structural
    } else if diagnostics.has_seasonality && n_observations >= MIN_SEASONAL_OBSERVATIONS {
        ModelKind::Seasonal
    } else if diagnostics.has_trend {
        ModelKind::Linear
    } else {
        ModelKind::MovingAverage
    };

    tracing::debug!(
        indicator,
        model = %chosen,
        n_observations,
        seasonal = diagnostics.has_seasonality,
        trend = diagnostics.has_trend,
        volatility = diagnostics.volatility,
        "model selected"
    );
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrideRule;

    fn diag(has_seasonality: bool, has_trend: bool) -> SeriesDiagnostics {
        SeriesDiagnostics {
            has_seasonality,
            has_trend,
            volatility: 0.1,
        }
    }

    fn no_overrides() -> ModelOverrides {
        ModelOverrides::empty()
    }

    #[test]
    fn test_inflation_override_prefers_structural() {
        let overrides = ModelOverrides::default();
        // Diagnostics are irrelevant for the overridden indicator
        assert_eq!(
            select_model("ipca", 24, &diag(false, false), true, &overrides),
            ModelKind::Structural
        );
        assert_eq!(
            select_model("IPCA", 30, &diag(false, true), true, &overrides),
            ModelKind::Structural
        );
    }

    #[test]
    fn test_inflation_override_falls_back_to_seasonal() {
        let overrides = ModelOverrides::default();
        assert_eq!(
            select_model("ipca", 100, &diag(false, true), false, &overrides),
            ModelKind::Seasonal
        );
        assert_eq!(
            select_model("ipca", 23, &diag(true, true), true, &overrides),
            ModelKind::Seasonal
        );
    }

    #[test]
    fn test_structural_rule_requires_all_conditions() {
        let o = no_overrides();
        assert_eq!(
            select_model("selic", 48, &diag(true, false), true, &o),
            ModelKind::Structural
        );
        assert_eq!(
            select_model("selic", 47, &diag(true, false), true, &o),
            ModelKind::Seasonal
        );
        assert_eq!(
            select_model("selic", 60, &diag(true, false), false, &o),
            ModelKind::Seasonal
        );
        assert_eq!(
            select_model("selic", 60, &diag(false, true), true, &o),
            ModelKind::Linear
        );
    }

    #[test]
    fn test_seasonal_then_linear_then_moving_average() {
        let o = no_overrides();
        assert_eq!(
            select_model("cambio", 24, &diag(true, true), false, &o),
            ModelKind::Seasonal
        );
        // Seasonal flag without enough history falls through to trend
        assert_eq!(
            select_model("cambio", 20, &diag(true, true), false, &o),
            ModelKind::Linear
        );
        assert_eq!(
            select_model("cambio", 36, &diag(false, true), false, &o),
            ModelKind::Linear
        );
        assert_eq!(
            select_model("cambio", 36, &diag(false, false), false, &o),
            ModelKind::MovingAverage
        );
    }

    #[test]
    fn test_custom_override_rule() {
        let overrides = ModelOverrides::empty().with_rule(
            "pib",
            OverrideRule {
                preferred: ModelKind::Linear,
                min_length: 36,
                fallback: ModelKind::MovingAverage,
            },
        );
        assert_eq!(
            select_model("PIB", 40, &diag(true, false), true, &overrides),
            ModelKind::Linear
        );
        assert_eq!(
            select_model("pib", 30, &diag(true, false), true, &overrides),
            ModelKind::MovingAverage
        );
    }

    #[test]
    fn test_model_kind_parse_and_name() {
        for kind in ModelKind::all() {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!("prophet".parse::<ModelKind>().unwrap(), ModelKind::Structural);
        assert!("arima".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_model_kind_serde_names() {
        let json = serde_json::to_string(&ModelKind::MovingAverage).unwrap();
        assert_eq!(json, "\"moving_average\"");
        let kind: ModelKind = serde_json::from_str("\"structural\"").unwrap();
        assert_eq!(kind, ModelKind::Structural);
    }
}
