//! Profile-driven initialization.
//!
//! Estimates total body water (TBW) from a user profile and splits it into
//! the three compartments using the ideal ratio. Also derives a daily
//! water requirement from weight, activity level and age.

use serde::{Deserialize, Serialize};

use crate::compartment::CompartmentState;
use crate::config::{ModelConfig, TbwFormula};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier on the base daily water requirement.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.0,
            Self::Light => 1.1,
            Self::Moderate => 1.2,
            Self::Active => 1.3,
            Self::VeryActive => 1.4,
        }
    }
}

/// User profile. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Height in cm.
    pub height_cm: Option<f64>,
    /// Weight in kg.
    pub weight_kg: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<BiologicalSex>,
    /// Muscle mass as a percentage of body weight.
    pub muscle_mass_pct: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has no weight")]
    MissingWeight,
    #[error("profile weight must be positive, got {0}")]
    InvalidWeight(f64),
    #[error("estimated body water is not positive ({0:.1} L)")]
    NonPositiveEstimate(f64),
}

fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn weight_fraction(weight: f64, sex: Option<BiologicalSex>) -> f64 {
    match sex {
        Some(BiologicalSex::Male) => weight * 0.6,
        _ => weight * 0.5,
    }
}

fn watson(weight: f64, age: u32, sex: BiologicalSex, height: Option<f64>) -> f64 {
    match sex {
        BiologicalSex::Male => {
            let height = height.unwrap_or(170.0);
            2.447 - 0.09516 * age as f64 + 0.1074 * height + 0.3362 * weight
        }
        BiologicalSex::Female => {
            let height = height.unwrap_or(160.0);
            -2.097 + 0.1069 * height + 0.2466 * weight
        }
    }
}

/// Estimate total body water in liters, rounded to 0.1 L.
///
/// Watson needs age and sex; without them the weight-fraction rule is used.
pub fn estimate_total_body_water(
    profile: &UserProfile,
    formula: TbwFormula,
) -> Result<f64, ProfileError> {
    let weight = profile.weight_kg.ok_or(ProfileError::MissingWeight)?;
    if !(weight > 0.0) {
        return Err(ProfileError::InvalidWeight(weight));
    }

    let mut tbw = match (formula, profile.age, profile.sex) {
        (TbwFormula::Watson, Some(age), Some(sex)) => watson(weight, age, sex, profile.height_cm),
        _ => weight_fraction(weight, profile.sex),
    };

    if let Some(muscle) = profile.muscle_mass_pct {
        tbw *= 1.0 + (muscle - 30.0) / 100.0;
    }

    let tbw = round_tenth(tbw);
    if tbw <= 0.0 {
        return Err(ProfileError::NonPositiveEstimate(tbw));
    }
    Ok(tbw)
}

/// Split `total_body_water` by the ideal ratio, each part rounded to 0.1 L.
pub fn split_body_water(total_body_water: f64, ratio: [f64; 3]) -> [f64; 3] {
    ratio.map(|r| round_tenth(total_body_water * r))
}

/// `base` with each compartment's water replaced from the profile's TBW
/// estimate. Solutes and hormones are untouched.
pub fn initial_state_from_profile(
    base: &CompartmentState,
    profile: &UserProfile,
    config: &ModelConfig,
) -> Result<CompartmentState, ProfileError> {
    let tbw = estimate_total_body_water(profile, config.tbw_formula)?;
    let split = split_body_water(tbw, config.scoring.ideal_ratio);
    log::info!(
        "profile TBW {:.1} L -> IVF {:.1} / ISF {:.1} / ICF {:.1}",
        tbw,
        split[0],
        split[1],
        split[2]
    );
    Ok(base.with_water(split))
}

/// Recommended daily water intake in ml.
pub fn daily_water_requirement_ml(profile: &UserProfile) -> Result<u32, ProfileError> {
    let weight = profile.weight_kg.ok_or(ProfileError::MissingWeight)?;
    if !(weight > 0.0) {
        return Err(ProfileError::InvalidWeight(weight));
    }
    let mut liters = weight * 0.033 * profile.activity_level.unwrap_or_default().multiplier();
    if profile.age.is_some_and(|age| age > 60) {
        liters *= 1.1;
    }
    Ok((liters * 1000.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Solute;

    fn male_70kg() -> UserProfile {
        UserProfile {
            height_cm: Some(175.0),
            weight_kg: Some(70.0),
            age: Some(30),
            sex: Some(BiologicalSex::Male),
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_watson_male() {
        // 2.447 - 2.8548 + 18.795 + 23.534 = 41.9212
        let tbw = estimate_total_body_water(&male_70kg(), TbwFormula::Watson).unwrap();
        assert_eq!(tbw, 41.9);
    }

    #[test]
    fn test_watson_female_default_height() {
        let profile = UserProfile {
            weight_kg: Some(60.0),
            age: Some(40),
            sex: Some(BiologicalSex::Female),
            ..UserProfile::default()
        };
        // -2.097 + 17.104 + 14.796 = 29.803
        let tbw = estimate_total_body_water(&profile, TbwFormula::Watson).unwrap();
        assert_eq!(tbw, 29.8);
    }

    #[test]
    fn test_weight_fraction() {
        let tbw = estimate_total_body_water(&male_70kg(), TbwFormula::WeightFraction).unwrap();
        assert_eq!(tbw, 42.0);
        let female = UserProfile {
            weight_kg: Some(60.0),
            sex: Some(BiologicalSex::Female),
            ..UserProfile::default()
        };
        assert_eq!(
            estimate_total_body_water(&female, TbwFormula::WeightFraction).unwrap(),
            30.0
        );
    }

    #[test]
    fn test_watson_falls_back_without_age() {
        let profile = UserProfile {
            age: None,
            ..male_70kg()
        };
        assert_eq!(
            estimate_total_body_water(&profile, TbwFormula::Watson).unwrap(),
            42.0
        );
    }

    #[test]
    fn test_muscle_mass_adjustment() {
        let profile = UserProfile {
            muscle_mass_pct: Some(40.0),
            ..male_70kg()
        };
        let tbw = estimate_total_body_water(&profile, TbwFormula::WeightFraction).unwrap();
        assert_eq!(tbw, 46.2);
    }

    #[test]
    fn test_missing_weight() {
        assert_eq!(
            estimate_total_body_water(&UserProfile::default(), TbwFormula::Watson),
            Err(ProfileError::MissingWeight)
        );
        let zero = UserProfile {
            weight_kg: Some(0.0),
            ..UserProfile::default()
        };
        assert_eq!(
            estimate_total_body_water(&zero, TbwFormula::Watson),
            Err(ProfileError::InvalidWeight(0.0))
        );
    }

    #[test]
    fn test_initial_state_replaces_water_only() {
        let config = ModelConfig {
            tbw_formula: TbwFormula::WeightFraction,
            ..ModelConfig::default()
        };
        let base = CompartmentState::baseline();
        let profile = UserProfile {
            weight_kg: Some(80.0),
            ..male_70kg()
        };
        let state = initial_state_from_profile(&base, &profile, &config).unwrap();
        // 48 L split 0.075 : 0.30 : 0.625
        assert_eq!(state.water_split(), [3.6, 14.4, 30.0]);
        assert_eq!(state.ivf[Solute::Na], 140.0);
        assert_eq!(state.icf[Solute::K], 140.0);
        assert_eq!(state.hormones, base.hormones);
    }

    #[test]
    fn test_daily_requirement() {
        // 70 * 0.033 * 1.2 = 2.772 L
        assert_eq!(daily_water_requirement_ml(&male_70kg()).unwrap(), 2772);
        let senior = UserProfile {
            age: Some(65),
            activity_level: Some(ActivityLevel::Sedentary),
            ..male_70kg()
        };
        // 70 * 0.033 * 1.0 * 1.1 = 2.541 L
        assert_eq!(daily_water_requirement_ml(&senior).unwrap(), 2541);
    }

    #[test]
    fn test_profile_json() {
        let profile: UserProfile = serde_json::from_str(
            r#"{ "weight_kg": 82.5, "sex": "male", "activity_level": "very_active" }"#,
        )
        .unwrap();
        assert_eq!(profile.weight_kg, Some(82.5));
        assert_eq!(profile.activity_level, Some(ActivityLevel::VeryActive));
        assert!(profile.age.is_none());
    }
}
