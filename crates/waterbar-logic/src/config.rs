//! Model configuration: scoring constants and safety policies.
//!
//! Every knob has a default matching the reference model, so
//! `ModelConfig::default()` scores exactly like the hydration coach. A
//! config file may override any subset of fields:
//!
//! ```
//! use waterbar_logic::config::{validate_config, ModelConfig, QuantityPolicy};
//!
//! let config = ModelConfig::from_json(r#"{ "quantity_policy": "clamp" }"#).unwrap();
//! assert_eq!(config.quantity_policy, QuantityPolicy::Clamp);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::reference;

/// What to do when an action would drive a quantity below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Keep negative values as computed.
    Allow,
    /// Floor every quantity at 0.
    Clamp,
    /// Refuse the whole action.
    Reject,
}

/// How hormone levels accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HormonePolicy {
    /// Plain additive accumulation with no bounds.
    Unbounded,
    /// Clamp each level into `[-limit, limit]` after every action.
    Bounded { limit: f64 },
}

/// Formula used to estimate total body water from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TbwFormula {
    /// Watson anthropometric formula (needs weight, age and sex).
    Watson,
    /// `weight × 0.6` for males, `weight × 0.5` otherwise.
    WeightFraction,
}

/// Constants used by the hydration scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub ideal_total_water: f64,
    pub ideal_ratio: [f64; 3],
    pub target_na: f64,
    pub target_k: f64,
    pub electrolyte_divisor: f64,
    pub hydration_weight: f64,
    pub ratio_weight: f64,
    pub electrolyte_weight: f64,
    /// Scores below this are "Severely Dehydrated".
    pub severe_below: f64,
    /// Scores below this are "Dehydrated".
    pub dehydrated_below: f64,
    /// Scores below this are "Mildly Dehydrated"; at or above, "Well Hydrated".
    pub mild_below: f64,
    /// Clamp each sub-score into `[0, 100]` before weighting.
    pub clamp_sub_scores: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ideal_total_water: reference::IDEAL_TOTAL_WATER,
            ideal_ratio: reference::IDEAL_RATIO,
            target_na: reference::TARGET_NA,
            target_k: reference::TARGET_K,
            electrolyte_divisor: reference::ELECTROLYTE_DIVISOR,
            hydration_weight: 0.5,
            ratio_weight: 0.3,
            electrolyte_weight: 0.2,
            severe_below: 40.0,
            dehydrated_below: 60.0,
            mild_below: 80.0,
            clamp_sub_scores: true,
        }
    }
}

/// Top-level model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scoring: ScoringConfig,
    pub quantity_policy: QuantityPolicy,
    pub hormone_policy: HormonePolicy,
    pub tbw_formula: TbwFormula,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            quantity_policy: QuantityPolicy::Reject,
            hormone_policy: HormonePolicy::Bounded { limit: 10.0 },
            tbw_formula: TbwFormula::Watson,
        }
    }
}

impl ModelConfig {
    /// Settings that reproduce the unguarded reference behavior: negative
    /// quantities, unbounded hormones and unclamped ratio scores.
    pub fn permissive() -> Self {
        Self {
            scoring: ScoringConfig {
                clamp_sub_scores: false,
                ..ScoringConfig::default()
            },
            quantity_policy: QuantityPolicy::Allow,
            hormone_policy: HormonePolicy::Unbounded,
            tbw_formula: TbwFormula::Watson,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("ideal total water must be positive, got {0}")]
    NonPositiveIdealWater(f64),
    #[error("ideal ratio entries must be non-negative and sum to 1, got {0:?}")]
    InvalidIdealRatio([f64; 3]),
    #[error("electrolyte divisor must be positive, got {0}")]
    NonPositiveDivisor(f64),
    #[error("score weights must be non-negative and sum to 1, got {0}")]
    WeightSumInvalid(f64),
    #[error("status thresholds must increase within 0..=100: {0} < {1} < {2}")]
    ThresholdsOutOfOrder(f64, f64, f64),
    #[error("hormone limit must be positive, got {0}")]
    NonPositiveHormoneLimit(f64),
}

/// Validate a model configuration, returning all errors found.
pub fn validate_config(config: &ModelConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let s = &config.scoring;

    if !(s.ideal_total_water > 0.0) {
        errors.push(ConfigError::NonPositiveIdealWater(s.ideal_total_water));
    }

    let ratio_sum: f64 = s.ideal_ratio.iter().sum();
    if s.ideal_ratio.iter().any(|r| !(*r >= 0.0)) || (ratio_sum - 1.0).abs() > 1e-6 {
        errors.push(ConfigError::InvalidIdealRatio(s.ideal_ratio));
    }

    if !(s.electrolyte_divisor > 0.0) {
        errors.push(ConfigError::NonPositiveDivisor(s.electrolyte_divisor));
    }

    let weights = [s.hydration_weight, s.ratio_weight, s.electrolyte_weight];
    let weight_sum: f64 = weights.iter().sum();
    if weights.iter().any(|w| !(*w >= 0.0)) || (weight_sum - 1.0).abs() > 1e-6 {
        errors.push(ConfigError::WeightSumInvalid(weight_sum));
    }

    let ordered = 0.0 <= s.severe_below
        && s.severe_below < s.dehydrated_below
        && s.dehydrated_below < s.mild_below
        && s.mild_below <= 100.0;
    if !ordered {
        errors.push(ConfigError::ThresholdsOutOfOrder(
            s.severe_below,
            s.dehydrated_below,
            s.mild_below,
        ));
    }

    if let HormonePolicy::Bounded { limit } = config.hormone_policy {
        if !(limit > 0.0) {
            errors.push(ConfigError::NonPositiveHormoneLimit(limit));
        }
    }

    errors
}
