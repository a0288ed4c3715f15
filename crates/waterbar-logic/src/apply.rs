//! Action applicator: merges an action's deltas into a state.
//!
//! [`apply_action`] is the raw additive merge. [`apply_action_checked`]
//! runs the same merge and then enforces the configured quantity and
//! hormone policies; the timeline always goes through the checked path.

use crate::catalog::HydrationAction;
use crate::compartment::CompartmentState;
use crate::config::{HormonePolicy, ModelConfig, QuantityPolicy};
use crate::constants::{Compartment, Hormone, Solute};

/// Apply every delta of `action` to a copy of `state`.
///
/// Absent quantities count as 0. Nothing is bounds-checked.
pub fn apply_action(state: &CompartmentState, action: &HydrationAction) -> CompartmentState {
    let mut next = *state;
    for (compartment, solute, delta) in action.deltas() {
        next.compartment_mut(compartment).add(solute, delta);
    }
    for (&hormone, &delta) in &action.hormones {
        next.hormones.add(hormone, delta);
    }
    next
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplyError {
    #[error("{action} would drive {compartment}.{solute} to {value}")]
    NegativeQuantity {
        action: String,
        compartment: Compartment,
        solute: Solute,
        value: f64,
    },
}

/// Apply `action` and enforce `config`'s quantity and hormone policies.
///
/// Only quantities the action touches are checked, so a state that is
/// already negative somewhere (from an earlier permissive run) does not
/// block unrelated actions.
pub fn apply_action_checked(
    state: &CompartmentState,
    action: &HydrationAction,
    config: &ModelConfig,
) -> Result<CompartmentState, ApplyError> {
    let mut next = apply_action(state, action);

    for (compartment, solute, _) in action.deltas() {
        let value = next.get(compartment, solute);
        if value >= 0.0 {
            continue;
        }
        match config.quantity_policy {
            QuantityPolicy::Allow => {}
            QuantityPolicy::Clamp => {
                log::warn!(
                    "{}: clamping {}.{} from {:.2} to 0",
                    action.id,
                    compartment,
                    solute,
                    value
                );
                next.compartment_mut(compartment).set(solute, 0.0);
            }
            QuantityPolicy::Reject => {
                log::warn!(
                    "{}: rejected, {}.{} would be {:.2}",
                    action.id,
                    compartment,
                    solute,
                    value
                );
                return Err(ApplyError::NegativeQuantity {
                    action: action.id.to_string(),
                    compartment,
                    solute,
                    value,
                });
            }
        }
    }

    if let HormonePolicy::Bounded { limit } = config.hormone_policy {
        for hormone in Hormone::ALL {
            let level = next.hormones.get(hormone);
            next.hormones.set(hormone, level.clamp(-limit, limit));
        }
    }

    log::debug!(
        "applied {}: total water {:.1} -> {:.1} L",
        action.id,
        state.total_water(),
        next.total_water()
    );
    Ok(next)
}
