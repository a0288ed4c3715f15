//! Pure hydration model logic for Water Bar.
//!
//! This crate contains the body-water compartment model and everything
//! derived from it. Functions take plain data and return results, making
//! them unit-testable and usable from a request handler, a UI state
//! container, or the headless harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`apply`] | Additive action applicator with quantity/hormone policies |
//! | [`catalog`] | Static action catalog, JSON loading, inverse actions |
//! | [`compartment`] | IVF/ISF/ICF state, hormone levels, osmolality |
//! | [`config`] | Scoring constants, safety policies, validation |
//! | [`constants`] | Compartment/solute/hormone enums, reference values |
//! | [`persistence`] | Versioned bincode snapshots of a timeline |
//! | [`profile`] | Total body water estimate, initial split, daily intake |
//! | [`scoring`] | 0–100 hydration score, status band, advice |
//! | [`timeline`] | Append-only event log, time-travel state derivation |

pub mod apply;
pub mod catalog;
pub mod compartment;
pub mod config;
pub mod constants;
pub mod persistence;
pub mod profile;
pub mod scoring;
pub mod timeline;

pub use apply::{apply_action, apply_action_checked};
pub use compartment::CompartmentState;
pub use scoring::calculate_hydration_status;
pub use timeline::derive_state_at_time;
