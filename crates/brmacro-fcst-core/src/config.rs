//! Engine configuration.
//!
//! `ForecastConfig` is built once at the composition root (explicitly or from
//! JSON) and passed to the engine. The forecast horizon is fixed by policy:
//! whatever horizon a caller supplies is replaced by
//! [`POLICY_HORIZON_MONTHS`] and the replacement is logged.

use crate::selection::ModelKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forecast horizon every result is produced for.
pub const POLICY_HORIZON_MONTHS: usize = 24;

/// Default confidence level reported with the bounds.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default minimum number of observations below which forecasting is refused.
pub const DEFAULT_MIN_DATA_POINTS: usize = 24;

/// Canonical code of the broad consumer price index.
pub const INFLATION_INDEX_CODE: &str = "ipca";

/// Immutable forecast parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ForecastConfigInput")]
pub struct ForecastConfig {
    horizon_months: usize,
    confidence_level: f64,
    min_data_points: usize,
    overrides: ModelOverrides,
}

/// Wire shape of the configuration; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForecastConfigInput {
    horizon_months: Option<i64>,
    confidence_level: Option<f64>,
    min_data_points: Option<usize>,
    overrides: Option<ModelOverrides>,
}

impl From<ForecastConfigInput> for ForecastConfig {
    fn from(input: ForecastConfigInput) -> Self {
        let config = ForecastConfig::new(
            input.horizon_months.unwrap_or(POLICY_HORIZON_MONTHS as i64),
            input.confidence_level.unwrap_or(DEFAULT_CONFIDENCE_LEVEL),
            input.min_data_points.unwrap_or(DEFAULT_MIN_DATA_POINTS),
        );
        match input.overrides {
            Some(overrides) => config.with_overrides(overrides),
            None => config,
        }
    }
}

impl ForecastConfig {
    /// Build a configuration. `requested_horizon` is coerced to
    /// [`POLICY_HORIZON_MONTHS`].
    pub fn new(requested_horizon: i64, confidence_level: f64, min_data_points: usize) -> Self {
        if requested_horizon != POLICY_HORIZON_MONTHS as i64 {
            tracing::info!(
                requested = requested_horizon,
                enforced = POLICY_HORIZON_MONTHS,
                "forecast horizon coerced to policy value"
            );
        }
        Self {
            horizon_months: POLICY_HORIZON_MONTHS,
            confidence_level,
            min_data_points,
            overrides: ModelOverrides::default(),
        }
    }

    /// Parse a JSON document, e.g. the `analytics` section handed over by the
    /// configuration collaborator.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Replace the indicator override table.
    pub fn with_overrides(mut self, overrides: ModelOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn horizon_months(&self) -> usize {
        self.horizon_months
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn min_data_points(&self) -> usize {
        self.min_data_points
    }

    pub fn overrides(&self) -> &ModelOverrides {
        &self.overrides
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::new(
            POLICY_HORIZON_MONTHS as i64,
            DEFAULT_CONFIDENCE_LEVEL,
            DEFAULT_MIN_DATA_POINTS,
        )
    }
}

/// Per-indicator model preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Model used when the rule is satisfiable.
    pub preferred: ModelKind,
    /// Minimum series length for `preferred`.
    pub min_length: usize,
    /// Model used otherwise.
    pub fallback: ModelKind,
}

/// Declarative table of indicator-specific model preferences, consulted by
/// the selector before any statistical rule. Codes are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, OverrideRule>",
    into = "BTreeMap<String, OverrideRule>"
)]
pub struct ModelOverrides {
    rules: BTreeMap<String, OverrideRule>,
}

impl ModelOverrides {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, indicator: &str, rule: OverrideRule) -> Option<OverrideRule> {
        self.rules.insert(normalize_code(indicator), rule)
    }

    pub fn with_rule(mut self, indicator: &str, rule: OverrideRule) -> Self {
        self.insert(indicator, rule);
        self
    }

    pub fn rule_for(&self, indicator: &str) -> Option<&OverrideRule> {
        self.rules.get(&normalize_code(indicator))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ModelOverrides {
    /// The inflation index prefers the structural model once two years of
    /// history exist, and seasonal decomposition otherwise.
    fn default() -> Self {
        Self::empty().with_rule(
            INFLATION_INDEX_CODE,
            OverrideRule {
                preferred: ModelKind::Structural,
                min_length: 24,
                fallback: ModelKind::Seasonal,
            },
        )
    }
}

impl From<BTreeMap<String, OverrideRule>> for ModelOverrides {
    fn from(map: BTreeMap<String, OverrideRule>) -> Self {
        map.into_iter()
            .fold(Self::empty(), |acc, (code, rule)| acc.with_rule(&code, rule))
    }
}

impl From<ModelOverrides> for BTreeMap<String, OverrideRule> {
    fn from(overrides: ModelOverrides) -> Self {
        overrides.rules
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon_months(), 24);
        assert_eq!(config.confidence_level(), 0.95);
        assert_eq!(config.min_data_points(), 24);
        assert!(config.overrides().rule_for("IPCA").is_some());
    }

    #[test]
    fn test_horizon_is_coerced() {
        assert_eq!(ForecastConfig::new(12, 0.95, 24).horizon_months(), 24);
        assert_eq!(ForecastConfig::new(0, 0.95, 24).horizon_months(), 24);
        assert_eq!(ForecastConfig::new(120, 0.95, 24).horizon_months(), 24);
        assert_eq!(ForecastConfig::new(-3, 0.95, 24).horizon_months(), 24);
    }

    #[test]
    fn test_from_json_applies_defaults_and_coercion() {
        let config =
            ForecastConfig::from_json(r#"{"horizon_months": 36, "min_data_points": 30}"#).unwrap();
        assert_eq!(config.horizon_months(), 24);
        assert_eq!(config.min_data_points(), 30);
        assert_eq!(config.confidence_level(), 0.95);
        assert!(config.overrides().rule_for("ipca").is_some());
    }

    #[test]
    fn test_from_json_overrides_table() {
        let config = ForecastConfig::from_json(
            r#"{
                "overrides": {
                    "SELIC": {"preferred": "linear", "min_length": 36, "fallback": "moving_average"}
                }
            }"#,
        )
        .unwrap();
        let overrides = config.overrides();
        assert_eq!(overrides.len(), 1);
        assert!(overrides.rule_for("ipca").is_none());
        let rule = overrides.rule_for("selic").unwrap();
        assert_eq!(rule.preferred, ModelKind::Linear);
        assert_eq!(rule.min_length, 36);
        assert_eq!(rule.fallback, ModelKind::MovingAverage);
    }

    #[test]
    fn test_override_lookup_is_case_insensitive() {
        let overrides = ModelOverrides::default();
        assert!(overrides.rule_for("ipca").is_some());
        assert!(overrides.rule_for(" IPCA ").is_some());
        assert!(overrides.rule_for("selic").is_none());
        assert!(ModelOverrides::empty().is_empty());
    }
}
