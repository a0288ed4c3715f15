//! Model constants: compartments, solutes, hormones and reference values.
//!
//! Compartment, solute and hormone names are closed enums so every lookup is
//! checked at compile time. Their serde names match the labels used in
//! catalog and snapshot JSON (`"IVF"`, `"H2O"`, `"ADH"`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three body-water compartments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Compartment {
    /// Intravascular fluid (blood plasma).
    #[serde(rename = "IVF")]
    Ivf,
    /// Interstitial fluid (between cells).
    #[serde(rename = "ISF")]
    Isf,
    /// Intracellular fluid (inside cells).
    #[serde(rename = "ICF")]
    Icf,
}

impl Compartment {
    pub const ALL: [Compartment; 3] = [Compartment::Ivf, Compartment::Isf, Compartment::Icf];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ivf => "Blood Vessels",
            Self::Isf => "Between Cells",
            Self::Icf => "Inside Cells",
        }
    }

    /// Solutes tracked for this compartment in the reference model.
    pub fn osmoles(self) -> &'static [Solute] {
        match self {
            Self::Ivf => &[Solute::Na, Solute::Albumin, Solute::Bun, Solute::Glucose],
            Self::Isf => &[Solute::Na, Solute::Cl, Solute::Glucose],
            Self::Icf => &[Solute::K, Solute::Mg, Solute::Pi, Solute::Glucose],
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ivf => "IVF",
            Self::Isf => "ISF",
            Self::Icf => "ICF",
        })
    }
}

/// A tracked quantity inside a compartment. `H2O` is water in liters; the
/// rest are solutes in their usual clinical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Solute {
    Na,
    K,
    Cl,
    Mg,
    Pi,
    Albumin,
    #[serde(rename = "BUN")]
    Bun,
    Glucose,
    #[serde(rename = "H2O")]
    H2o,
}

impl Solute {
    pub const COUNT: usize = 9;

    pub const ALL: [Solute; Self::COUNT] = [
        Solute::Na,
        Solute::K,
        Solute::Cl,
        Solute::Mg,
        Solute::Pi,
        Solute::Albumin,
        Solute::Bun,
        Solute::Glucose,
        Solute::H2o,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Solute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Na => "Na",
            Self::K => "K",
            Self::Cl => "Cl",
            Self::Mg => "Mg",
            Self::Pi => "Pi",
            Self::Albumin => "Albumin",
            Self::Bun => "BUN",
            Self::Glucose => "Glucose",
            Self::H2o => "H2O",
        })
    }
}

/// Hormones whose levels the model accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hormone {
    Aldosterone,
    #[serde(rename = "ADH")]
    Adh,
    Cortisol,
    Estrogen,
    Testosterone,
}

impl Hormone {
    pub const COUNT: usize = 5;

    pub const ALL: [Hormone; Self::COUNT] = [
        Hormone::Aldosterone,
        Hormone::Adh,
        Hormone::Cortisol,
        Hormone::Estrogen,
        Hormone::Testosterone,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Hormone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aldosterone => "Aldosterone",
            Self::Adh => "ADH",
            Self::Cortisol => "Cortisol",
            Self::Estrogen => "Estrogen",
            Self::Testosterone => "Testosterone",
        })
    }
}

/// Reference values shared by the scorer and profile initialization.
pub mod reference {
    /// Total body water (liters) that counts as 100% hydrated.
    pub const IDEAL_TOTAL_WATER: f64 = 40.0;
    /// Ideal IVF : ISF : ICF water split.
    pub const IDEAL_RATIO: [f64; 3] = [0.075, 0.30, 0.625];
    /// Target plasma sodium (mmol/L).
    pub const TARGET_NA: f64 = 140.0;
    /// Target intracellular potassium (mmol/L).
    pub const TARGET_K: f64 = 140.0;
    /// Each unit of electrolyte deviation costs `1 / ELECTROLYTE_DIVISOR` points.
    pub const ELECTROLYTE_DIVISOR: f64 = 2.0;
}
