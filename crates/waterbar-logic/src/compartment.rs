//! Compartment state: water, solutes and hormone levels.
//!
//! `CompartmentState` is a plain `Copy` value: every operation that changes
//! it returns a new value, so two snapshots can never alias each other.
//! Every solute slot exists in every compartment and starts at 0, which is
//! how absent fields are treated throughout the model.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::constants::{Compartment, Hormone, Solute};

/// Quantities held by one compartment, indexed by [`Solute`].
///
/// Serialized as a map that omits zero entries; missing entries read back
/// as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Solute, f64>", into = "BTreeMap<Solute, f64>")]
pub struct SoluteLevels([f64; Solute::COUNT]);

impl SoluteLevels {
    pub fn from_pairs(pairs: &[(Solute, f64)]) -> Self {
        let mut levels = Self::default();
        for &(solute, value) in pairs {
            levels.0[solute.index()] += value;
        }
        levels
    }

    pub fn get(&self, solute: Solute) -> f64 {
        self.0[solute.index()]
    }

    pub fn set(&mut self, solute: Solute, value: f64) {
        self.0[solute.index()] = value;
    }

    pub fn add(&mut self, solute: Solute, delta: f64) {
        self.0[solute.index()] += delta;
    }

    pub fn water(&self) -> f64 {
        self.get(Solute::H2o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Solute, f64)> + '_ {
        Solute::ALL.iter().map(move |&s| (s, self.0[s.index()]))
    }

    /// Approximate osmolality in mOsm/kg:
    /// `2·(Na + K + Cl) + Glucose/18 + BUN/2.8`, rounded.
    pub fn osmolality(&self) -> f64 {
        let ions = self.get(Solute::Na) + self.get(Solute::K) + self.get(Solute::Cl);
        (2.0 * ions + self.get(Solute::Glucose) / 18.0 + self.get(Solute::Bun) / 2.8).round()
    }
}

impl Index<Solute> for SoluteLevels {
    type Output = f64;

    fn index(&self, solute: Solute) -> &f64 {
        &self.0[solute.index()]
    }
}

impl From<BTreeMap<Solute, f64>> for SoluteLevels {
    fn from(map: BTreeMap<Solute, f64>) -> Self {
        let mut levels = Self::default();
        for (solute, value) in map {
            levels.set(solute, value);
        }
        levels
    }
}

impl From<SoluteLevels> for BTreeMap<Solute, f64> {
    fn from(levels: SoluteLevels) -> Self {
        levels.iter().filter(|&(_, v)| v != 0.0).collect()
    }
}

/// Signed hormone levels, indexed by [`Hormone`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Hormone, f64>", into = "BTreeMap<Hormone, f64>")]
pub struct HormoneLevels([f64; Hormone::COUNT]);

impl HormoneLevels {
    pub fn get(&self, hormone: Hormone) -> f64 {
        self.0[hormone.index()]
    }

    pub fn set(&mut self, hormone: Hormone, value: f64) {
        self.0[hormone.index()] = value;
    }

    pub fn add(&mut self, hormone: Hormone, delta: f64) {
        self.0[hormone.index()] += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hormone, f64)> + '_ {
        Hormone::ALL.iter().map(move |&h| (h, self.0[h.index()]))
    }
}

impl Index<Hormone> for HormoneLevels {
    type Output = f64;

    fn index(&self, hormone: Hormone) -> &f64 {
        &self.0[hormone.index()]
    }
}

impl From<BTreeMap<Hormone, f64>> for HormoneLevels {
    fn from(map: BTreeMap<Hormone, f64>) -> Self {
        let mut levels = Self::default();
        for (hormone, value) in map {
            levels.set(hormone, value);
        }
        levels
    }
}

impl From<HormoneLevels> for BTreeMap<Hormone, f64> {
    fn from(levels: HormoneLevels) -> Self {
        levels.iter().filter(|&(_, v)| v != 0.0).collect()
    }
}

/// Full body-water snapshot: three compartments plus hormones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    #[serde(rename = "IVF", default)]
    pub ivf: SoluteLevels,
    #[serde(rename = "ISF", default)]
    pub isf: SoluteLevels,
    #[serde(rename = "ICF", default)]
    pub icf: SoluteLevels,
    #[serde(rename = "Hormones", default)]
    pub hormones: HormoneLevels,
}

impl Default for CompartmentState {
    fn default() -> Self {
        Self::baseline()
    }
}

impl CompartmentState {
    /// Every quantity and hormone at 0.
    pub fn empty() -> Self {
        Self {
            ivf: SoluteLevels::default(),
            isf: SoluteLevels::default(),
            icf: SoluteLevels::default(),
            hormones: HormoneLevels::default(),
        }
    }

    /// Reference state for a typical adult with 40 L of body water.
    pub fn baseline() -> Self {
        use Solute::*;
        Self {
            ivf: SoluteLevels::from_pairs(&[
                (Na, 140.0),
                (Albumin, 4.0),
                (Bun, 15.0),
                (Glucose, 90.0),
                (H2o, 3.0),
            ]),
            isf: SoluteLevels::from_pairs(&[(Na, 140.0), (Cl, 100.0), (Glucose, 90.0), (H2o, 12.0)]),
            icf: SoluteLevels::from_pairs(&[
                (K, 140.0),
                (Mg, 30.0),
                (Pi, 100.0),
                (Glucose, 20.0),
                (H2o, 25.0),
            ]),
            hormones: HormoneLevels::default(),
        }
    }

    pub fn compartment(&self, compartment: Compartment) -> &SoluteLevels {
        match compartment {
            Compartment::Ivf => &self.ivf,
            Compartment::Isf => &self.isf,
            Compartment::Icf => &self.icf,
        }
    }

    pub fn compartment_mut(&mut self, compartment: Compartment) -> &mut SoluteLevels {
        match compartment {
            Compartment::Ivf => &mut self.ivf,
            Compartment::Isf => &mut self.isf,
            Compartment::Icf => &mut self.icf,
        }
    }

    pub fn get(&self, compartment: Compartment, solute: Solute) -> f64 {
        self.compartment(compartment).get(solute)
    }

    /// Water volume of each compartment, in `Compartment::ALL` order.
    pub fn water_split(&self) -> [f64; 3] {
        [self.ivf.water(), self.isf.water(), self.icf.water()]
    }

    pub fn total_water(&self) -> f64 {
        self.water_split().iter().sum()
    }

    /// Copy of this state with each compartment's water replaced.
    /// Solutes and hormones are kept.
    pub fn with_water(&self, split: [f64; 3]) -> Self {
        let mut next = *self;
        for (compartment, water) in Compartment::ALL.into_iter().zip(split) {
            next.compartment_mut(compartment).set(Solute::H2o, water);
        }
        next
    }

    /// Every `(compartment, solute, value)` triple.
    pub fn quantities(&self) -> impl Iterator<Item = (Compartment, Solute, f64)> + '_ {
        Compartment::ALL
            .into_iter()
            .flat_map(move |c| self.compartment(c).iter().map(move |(s, v)| (c, s, v)))
    }

    /// The most negative quantity, if any quantity is below zero.
    pub fn lowest_negative(&self) -> Option<(Compartment, Solute, f64)> {
        self.quantities()
            .filter(|&(_, _, v)| v < 0.0)
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Osmolality of each compartment, in `Compartment::ALL` order.
    pub fn osmolalities(&self) -> [f64; 3] {
        [
            self.ivf.osmolality(),
            self.isf.osmolality(),
            self.icf.osmolality(),
        ]
    }

    /// Sum of absolute deviations of each compartment's osmolality from the
    /// mean. 0 means the compartments are in osmotic equilibrium.
    pub fn osmotic_gradient(&self) -> f64 {
        let osm = self.osmolalities();
        let mean = osm.iter().sum::<f64>() / 3.0;
        osm.iter().map(|o| (o - mean).abs()).sum()
    }

    /// Field-by-field comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let quantities = self
            .quantities()
            .zip(other.quantities())
            .all(|(a, b)| (a.2 - b.2).abs() <= epsilon);
        let hormones = self
            .hormones
            .iter()
            .zip(other.hormones.iter())
            .all(|(a, b)| (a.1 - b.1).abs() <= epsilon);
        quantities && hormones
    }
}
