//! Property tests for the applicator and scorer.
//!
//! Quantities are drawn as multiples of 0.25 so additions and their
//! inverses are exact in floating point.

use proptest::prelude::*;

use waterbar_logic::catalog::{negate, HydrationAction};
use waterbar_logic::compartment::{CompartmentState, SoluteLevels};
use waterbar_logic::config::{ModelConfig, ScoringConfig};
use waterbar_logic::constants::{Compartment, Hormone, Solute};
use waterbar_logic::scoring::score_breakdown;
use waterbar_logic::{apply_action, calculate_hydration_status};

fn quarter(lo: i32, hi: i32) -> impl Strategy<Value = f64> + Clone {
    (lo..hi).prop_map(|n| n as f64 / 4.0)
}

fn levels(values: [f64; Solute::COUNT]) -> SoluteLevels {
    let pairs: Vec<(Solute, f64)> = Solute::ALL.into_iter().zip(values).collect();
    SoluteLevels::from_pairs(&pairs)
}

fn state_from(
    ivf: [f64; Solute::COUNT],
    isf: [f64; Solute::COUNT],
    icf: [f64; Solute::COUNT],
    hormones: [f64; Hormone::COUNT],
) -> CompartmentState {
    let mut state = CompartmentState::empty();
    state.ivf = levels(ivf);
    state.isf = levels(isf);
    state.icf = levels(icf);
    for (h, v) in Hormone::ALL.into_iter().zip(hormones) {
        state.hormones.set(h, v);
    }
    state
}

fn exact_state() -> impl Strategy<Value = CompartmentState> {
    (
        prop::array::uniform9(quarter(-400, 1200)),
        prop::array::uniform9(quarter(-400, 1200)),
        prop::array::uniform9(quarter(-400, 1200)),
        prop::array::uniform5(quarter(-80, 80)),
    )
        .prop_map(|(a, b, c, h)| state_from(a, b, c, h))
}

fn finite_state() -> impl Strategy<Value = CompartmentState> {
    (
        prop::array::uniform9(-1.0e6..1.0e6f64),
        prop::array::uniform9(-1.0e6..1.0e6f64),
        prop::array::uniform9(-1.0e6..1.0e6f64),
        prop::array::uniform5(-1.0e3..1.0e3f64),
    )
        .prop_map(|(a, b, c, h)| state_from(a, b, c, h))
}

fn action() -> impl Strategy<Value = HydrationAction> {
    (
        prop::collection::vec((0..3usize, 0..Solute::COUNT, quarter(-40, 40)), 0..6),
        prop::collection::vec((0..Hormone::COUNT, quarter(-12, 12)), 0..3),
    )
        .prop_map(|(effects, hormones)| {
            let mut action = HydrationAction::new("generated", "Generated", "");
            for (c, s, d) in effects {
                action = action.effect(Compartment::ALL[c], Solute::ALL[s], d);
            }
            for (h, d) in hormones {
                action = action.hormone(Hormone::ALL[h], d);
            }
            action
        })
}

proptest! {
    #[test]
    fn apply_does_not_mutate_input(state in exact_state(), action in action()) {
        let before = state;
        let _ = apply_action(&state, &action);
        prop_assert_eq!(state, before);
    }

    #[test]
    fn apply_is_deterministic(state in exact_state(), action in action()) {
        prop_assert_eq!(apply_action(&state, &action), apply_action(&state, &action));
    }

    #[test]
    fn single_delta_touches_one_field(
        state in exact_state(),
        c in 0..3usize,
        s in 0..Solute::COUNT,
        d in quarter(-40, 40),
    ) {
        let (compartment, solute) = (Compartment::ALL[c], Solute::ALL[s]);
        let action = HydrationAction::new("one", "One", "").effect(compartment, solute, d);
        let next = apply_action(&state, &action);

        for ((c1, s1, v1), (_, _, v0)) in next.quantities().zip(state.quantities()) {
            if c1 == compartment && s1 == solute {
                prop_assert_eq!(v1, v0 + d);
            } else {
                prop_assert_eq!(v1, v0);
            }
        }
        prop_assert_eq!(next.hormones, state.hormones);
    }

    #[test]
    fn negated_action_restores_state(state in exact_state(), action in action()) {
        let there = apply_action(&state, &action);
        let back = apply_action(&there, &negate(&action));
        prop_assert_eq!(back, state);
    }

    #[test]
    fn score_is_bounded(state in finite_state()) {
        let config = ScoringConfig::default();
        let b = score_breakdown(&state, &config);
        prop_assert!((0.0..=100.0).contains(&b.hydration_percent));
        prop_assert!((0.0..=100.0).contains(&b.ratio_score));
        prop_assert!((0.0..=100.0).contains(&b.electrolyte_score));

        let status = calculate_hydration_status(&state, &config);
        prop_assert!((0..=100).contains(&status.score));
    }

    #[test]
    fn permissive_score_is_bounded(state in finite_state()) {
        let status = calculate_hydration_status(&state, &ModelConfig::permissive().scoring);
        prop_assert!((0..=100).contains(&status.score));
        prop_assert!((0..=100).contains(&status.details.hydration_percent));
        prop_assert!((0..=100).contains(&status.details.ratio_score));
        prop_assert!((0..=100).contains(&status.details.electrolyte_score));
    }

    #[test]
    fn zero_water_never_nan(state in finite_state()) {
        let dry = state.with_water([0.0, 0.0, 0.0]);
        let b = score_breakdown(&dry, &ScoringConfig::default());
        prop_assert_eq!(b.hydration_percent, 0.0);
        prop_assert!(!b.overall.is_nan());
    }
}
