//! Hydration scorer: reduces a compartment state to a 0–100 score.
//!
//! The score blends three sub-scores:
//!
//! | Sub-score | Weight | Measures |
//! |-----------|--------|----------|
//! | hydration | 0.5 | total water against the ideal volume |
//! | ratio | 0.3 | IVF/ISF/ICF split against 0.075 : 0.30 : 0.625 |
//! | electrolyte | 0.2 | plasma Na and intracellular K against 140 |
//!
//! The scorer is total over finite inputs. Zero (or negative) total water
//! scores 0 for both hydration and ratio instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::compartment::CompartmentState;
use crate::config::ScoringConfig;
use crate::constants::Solute;

/// Qualitative hydration band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HydrationBand {
    SeverelyDehydrated,
    Dehydrated,
    MildlyDehydrated,
    WellHydrated,
}

impl HydrationBand {
    pub fn from_score(score: f64, config: &ScoringConfig) -> Self {
        if score < config.severe_below {
            Self::SeverelyDehydrated
        } else if score < config.dehydrated_below {
            Self::Dehydrated
        } else if score < config.mild_below {
            Self::MildlyDehydrated
        } else {
            Self::WellHydrated
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SeverelyDehydrated => "Severely Dehydrated",
            Self::Dehydrated => "Dehydrated",
            Self::MildlyDehydrated => "Mildly Dehydrated",
            Self::WellHydrated => "Well Hydrated",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Self::SeverelyDehydrated => "Drink water with electrolytes immediately!",
            Self::Dehydrated => "Drink more water and consider adding electrolytes.",
            Self::MildlyDehydrated => "Have a glass of water soon.",
            Self::WellHydrated => "Keep up the good work!",
        }
    }
}

/// Unrounded sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub hydration_percent: f64,
    pub ratio_score: f64,
    pub electrolyte_score: f64,
    pub overall: f64,
}

/// Sub-scores rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub hydration_percent: i32,
    pub ratio_score: i32,
    pub electrolyte_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationStatus {
    pub score: i32,
    pub band: HydrationBand,
    pub status: String,
    pub advice: String,
    pub details: ScoreDetails,
}

/// `100 − |value − target| / divisor`, floored at 0 and capped at 100.
fn balance(value: f64, target: f64, divisor: f64) -> f64 {
    (100.0 - (value - target).abs() / divisor).clamp(0.0, 100.0)
}

/// Reported values are whole numbers in `0..=100`, whatever the raw
/// breakdown holds.
fn percent(value: f64) -> i32 {
    value.clamp(0.0, 100.0).round() as i32
}

/// Compute every sub-score without rounding.
pub fn score_breakdown(state: &CompartmentState, config: &ScoringConfig) -> ScoreBreakdown {
    let split = state.water_split();
    let total_water: f64 = split.iter().sum();

    let (hydration_percent, ratio_score) = if total_water > 0.0 {
        let hydration = (total_water / config.ideal_total_water * 100.0).clamp(0.0, 100.0);
        let deviation: f64 = split
            .iter()
            .zip(config.ideal_ratio)
            .map(|(water, ideal)| (water / total_water - ideal).abs())
            .sum();
        (hydration, 100.0 - deviation * 100.0)
    } else {
        (0.0, 0.0)
    };

    let na_balance = balance(
        state.ivf.get(Solute::Na),
        config.target_na,
        config.electrolyte_divisor,
    );
    let k_balance = balance(
        state.icf.get(Solute::K),
        config.target_k,
        config.electrolyte_divisor,
    );
    let electrolyte_score = (na_balance + k_balance) / 2.0;

    let ratio_score = if config.clamp_sub_scores {
        ratio_score.clamp(0.0, 100.0)
    } else {
        ratio_score
    };

    let overall = hydration_percent * config.hydration_weight
        + ratio_score * config.ratio_weight
        + electrolyte_score * config.electrolyte_weight;

    ScoreBreakdown {
        hydration_percent,
        ratio_score,
        electrolyte_score,
        overall,
    }
}

/// Score `state` and describe the result.
///
/// The banding uses the unrounded overall score. The reported `score` and
/// `details` are clamped to `0..=100` and rounded, so they stay in range
/// even when `clamp_sub_scores` is off and the raw ratio goes negative.
pub fn calculate_hydration_status(
    state: &CompartmentState,
    config: &ScoringConfig,
) -> HydrationStatus {
    let breakdown = score_breakdown(state, config);
    let band = HydrationBand::from_score(breakdown.overall, config);

    HydrationStatus {
        score: percent(breakdown.overall),
        band,
        status: band.label().to_string(),
        advice: band.advice().to_string(),
        details: ScoreDetails {
            hydration_percent: percent(breakdown.hydration_percent),
            ratio_score: percent(breakdown.ratio_score),
            electrolyte_score: percent(breakdown.electrolyte_score),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_action;
    use crate::catalog::ActionCatalog;
    use crate::config::ModelConfig;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_baseline_scores_100() {
        let status = calculate_hydration_status(&CompartmentState::baseline(), &cfg());
        assert_eq!(status.score, 100);
        assert_eq!(status.band, HydrationBand::WellHydrated);
        assert_eq!(status.status, "Well Hydrated");
        assert_eq!(status.advice, "Keep up the good work!");
        assert_eq!(
            status.details,
            ScoreDetails {
                hydration_percent: 100,
                ratio_score: 100,
                electrolyte_score: 100,
            }
        );
    }

    #[test]
    fn test_exercise_once() {
        let exercise = ActionCatalog::builtin().get("exercise").unwrap();
        let state = apply_action(&CompartmentState::baseline(), exercise);
        let b = score_breakdown(&state, &cfg());
        assert!((b.hydration_percent - 90.0).abs() < 1e-9);
        // |2/36 - 0.075| + |9/36 - 0.3| + |25/36 - 0.625| = 0.138889
        assert!((b.ratio_score - 86.1111).abs() < 1e-3);
        assert_eq!(b.electrolyte_score, 100.0);
        // 45 + 25.8333 + 20
        assert!((b.overall - 90.8333).abs() < 1e-3);

        let status = calculate_hydration_status(&state, &cfg());
        assert_eq!(status.score, 91);
        assert_eq!(status.status, "Well Hydrated");
        assert_eq!(status.details.ratio_score, 86);
    }

    #[test]
    fn test_empty_water_is_zero_not_nan() {
        let state = CompartmentState::empty();
        let b = score_breakdown(&state, &cfg());
        assert_eq!(b.hydration_percent, 0.0);
        assert_eq!(b.ratio_score, 0.0);
        assert!(!b.overall.is_nan());
        // Na and K at 0 are 140 away from target: 100 - 70 = 30 each
        assert_eq!(b.electrolyte_score, 30.0);
        let status = calculate_hydration_status(&state, &cfg());
        assert_eq!(status.score, 6);
        assert_eq!(status.band, HydrationBand::SeverelyDehydrated);
    }

    #[test]
    fn test_negative_total_water() {
        let state = CompartmentState::baseline().with_water([-1.0, -2.0, 0.0]);
        let status = calculate_hydration_status(&state, &cfg());
        assert_eq!(status.details.hydration_percent, 0);
        assert!(status.score >= 0);
    }

    #[test]
    fn test_ratio_clamped_by_default() {
        // Positive total but badly skewed split: ratio would be 100 - 100·(0.925+0.3+0.625) < 0
        let state = CompartmentState::baseline().with_water([41.0, -0.5, -0.5]);
        let clamped = score_breakdown(&state, &cfg());
        assert_eq!(clamped.ratio_score, 0.0);

        let unclamped_cfg = ScoringConfig {
            clamp_sub_scores: false,
            ..cfg()
        };
        let raw = score_breakdown(&state, &unclamped_cfg);
        assert!(raw.ratio_score < 0.0);
        assert!(raw.overall < clamped.overall);
    }

    #[test]
    fn test_unclamped_ratio_still_reports_bounded_score() {
        let state = CompartmentState::baseline().with_water([10.0, -9.9, 0.0]);
        let scoring = ModelConfig::permissive().scoring;

        let raw = score_breakdown(&state, &scoring);
        assert!(raw.ratio_score < -10_000.0);
        assert!(raw.overall < 0.0);

        let status = calculate_hydration_status(&state, &scoring);
        assert_eq!(status.score, 0);
        assert_eq!(status.details.ratio_score, 0);
        assert_eq!(status.details.electrolyte_score, 100);
        assert_eq!(status.band, HydrationBand::SeverelyDehydrated);
    }

    #[test]
    fn test_hydration_percent_capped() {
        let state = CompartmentState::baseline().with_water([6.0, 24.0, 50.0]);
        let b = score_breakdown(&state, &cfg());
        assert_eq!(b.hydration_percent, 100.0);
        assert!((b.ratio_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_electrolyte_imbalance() {
        let mut state = CompartmentState::baseline();
        state.ivf.set(Solute::Na, 160.0); // 100 - 10 = 90
        state.icf.set(Solute::K, 100.0); // 100 - 20 = 80
        let b = score_breakdown(&state, &cfg());
        assert_eq!(b.electrolyte_score, 85.0);
    }

    #[test]
    fn test_band_thresholds() {
        let c = cfg();
        assert_eq!(HydrationBand::from_score(0.0, &c), HydrationBand::SeverelyDehydrated);
        assert_eq!(HydrationBand::from_score(39.9, &c), HydrationBand::SeverelyDehydrated);
        assert_eq!(HydrationBand::from_score(40.0, &c), HydrationBand::Dehydrated);
        assert_eq!(HydrationBand::from_score(59.9, &c), HydrationBand::Dehydrated);
        assert_eq!(HydrationBand::from_score(60.0, &c), HydrationBand::MildlyDehydrated);
        assert_eq!(HydrationBand::from_score(79.9, &c), HydrationBand::MildlyDehydrated);
        assert_eq!(HydrationBand::from_score(80.0, &c), HydrationBand::WellHydrated);
        assert_eq!(HydrationBand::from_score(100.0, &c), HydrationBand::WellHydrated);
    }

    #[test]
    fn test_repeated_coffee_degrades() {
        let coffee = ActionCatalog::builtin().get("coffee").unwrap();
        let mut state = CompartmentState::baseline();
        let mut last = calculate_hydration_status(&state, &cfg()).score;
        for _ in 0..3 {
            state = apply_action(&state, coffee);
            let score = calculate_hydration_status(&state, &cfg()).score;
            assert!(score <= last);
            last = score;
        }
        assert!(last < 100);
    }
}
