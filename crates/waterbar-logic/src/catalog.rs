//! Hydration action catalog.
//!
//! Actions are immutable data: per-compartment solute deltas plus optional
//! hormone deltas. The builtin catalog is built once per process and shared;
//! alternative catalogs can be loaded from JSON in the same shape as
//! `data/action_catalog.json`.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::constants::{Compartment, Hormone, Solute};

/// Builtin catalog as JSON (same data the harness validates).
pub const CATALOG_JSON: &str = include_str!("../../../data/action_catalog.json");

/// Stable identifier of a catalog action (`"water"`, `"exercise"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named intervention and the deltas it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationAction {
    pub id: ActionId,
    pub name: String,
    pub effects: BTreeMap<Compartment, BTreeMap<Solute, f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hormones: BTreeMap<Hormone, f64>,
    pub description: String,
}

impl HydrationAction {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: ActionId::new(id),
            name: name.to_string(),
            effects: BTreeMap::new(),
            hormones: BTreeMap::new(),
            description: description.to_string(),
        }
    }

    /// Add `delta` of `solute` to `compartment`. Repeated calls accumulate.
    pub fn effect(mut self, compartment: Compartment, solute: Solute, delta: f64) -> Self {
        *self
            .effects
            .entry(compartment)
            .or_default()
            .entry(solute)
            .or_insert(0.0) += delta;
        self
    }

    pub fn hormone(mut self, hormone: Hormone, delta: f64) -> Self {
        *self.hormones.entry(hormone).or_insert(0.0) += delta;
        self
    }

    /// Every `(compartment, solute, delta)` this action declares.
    pub fn deltas(&self) -> impl Iterator<Item = (Compartment, Solute, f64)> + '_ {
        self.effects
            .iter()
            .flat_map(|(&c, solutes)| solutes.iter().map(move |(&s, &d)| (c, s, d)))
    }

    /// Net water change across all compartments.
    pub fn water_delta(&self) -> f64 {
        self.deltas()
            .filter(|&(_, s, _)| s == Solute::H2o)
            .map(|(_, _, d)| d)
            .sum()
    }
}

/// The inverse of `action`: every solute and hormone delta negated.
pub fn negate(action: &HydrationAction) -> HydrationAction {
    HydrationAction {
        id: ActionId::new(format!("undo:{}", action.id)),
        name: format!("Undo {}", action.name),
        effects: action
            .effects
            .iter()
            .map(|(&c, solutes)| (c, solutes.iter().map(|(&s, &d)| (s, -d)).collect()))
            .collect(),
        hormones: action.hormones.iter().map(|(&h, &d)| (h, -d)).collect(),
        description: format!("Reverses: {}", action.description),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse action catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate action id: {0}")]
    DuplicateId(ActionId),
    #[error("action {id} has a non-finite delta")]
    NonFiniteDelta { id: ActionId },
}

/// Ordered set of actions with lookup by [`ActionId`].
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<HydrationAction>,
    index: HashMap<ActionId, usize>,
}

impl ActionCatalog {
    pub fn from_actions(actions: Vec<HydrationAction>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            let finite = action.deltas().all(|(_, _, d)| d.is_finite())
                && action.hormones.values().all(|d| d.is_finite());
            if !finite {
                return Err(CatalogError::NonFiniteDelta {
                    id: action.id.clone(),
                });
            }
            if index.insert(action.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(action.id.clone()));
            }
        }
        Ok(Self { actions, index })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let actions: Vec<HydrationAction> = serde_json::from_str(json)?;
        Self::from_actions(actions)
    }

    /// Process-wide builtin catalog.
    pub fn builtin() -> &'static ActionCatalog {
        static BUILTIN: OnceLock<ActionCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let actions = builtin_actions();
            let index = actions
                .iter()
                .enumerate()
                .map(|(i, a)| (a.id.clone(), i))
                .collect();
            Self { actions, index }
        })
    }

    pub fn get(&self, id: &str) -> Option<&HydrationAction> {
        self.index.get(id).map(|&i| &self.actions[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HydrationAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// The builtin interventions.
pub fn builtin_actions() -> Vec<HydrationAction> {
    use Compartment::*;
    use Hormone::*;
    use Solute::*;

    vec![
        HydrationAction::new(
            "water",
            "Pure Water",
            "Pure water is quickly absorbed into your bloodstream.",
        )
        .effect(Ivf, H2o, 2.0)
        .hormone(Adh, -1.0),
        HydrationAction::new(
            "miso",
            "Miso Broth",
            "Adds sodium and umami compounds to your bloodstream.",
        )
        .effect(Ivf, Na, 5.0)
        .effect(Ivf, Bun, 1.0)
        .hormone(Aldosterone, -1.0),
        HydrationAction::new(
            "banana",
            "Banana",
            "Adds potassium and glucose, primarily affecting your cells.",
        )
        .effect(Icf, K, 5.0)
        .effect(Icf, Glucose, 2.0)
        .hormone(Aldosterone, -2.0),
        HydrationAction::new(
            "run",
            "Run 20 min",
            "Exercise depletes electrolytes through sweat and increases metabolic activity.",
        )
        .effect(Isf, Na, -3.0)
        .effect(Isf, Cl, -3.0)
        .effect(Ivf, Bun, 1.0)
        .effect(Icf, K, -2.0)
        .hormone(Aldosterone, 2.0)
        .hormone(Adh, 2.0)
        .hormone(Cortisol, 1.0)
        .hormone(Testosterone, 1.0),
        HydrationAction::new(
            "electrolyte",
            "Electrolyte Drink",
            "Replenishes sodium and water, helping maintain fluid balance.",
        )
        .effect(Ivf, Na, 3.0)
        .effect(Ivf, H2o, 2.0)
        .effect(Isf, H2o, 1.0)
        .hormone(Adh, -1.0),
        HydrationAction::new(
            "mineral",
            "Mineral Water",
            "Natural minerals enhance hydration and cellular function.",
        )
        .effect(Ivf, Na, 1.0)
        .effect(Ivf, H2o, 2.0)
        .effect(Isf, H2o, 1.0)
        .hormone(Adh, -1.0),
        HydrationAction::new(
            "coconut",
            "Coconut Water",
            "Nature's electrolyte drink, rich in potassium.",
        )
        .effect(Ivf, K, 2.0)
        .effect(Ivf, H2o, 2.0)
        .effect(Isf, H2o, 1.0)
        .hormone(Adh, -1.0)
        .hormone(Aldosterone, -1.0),
        HydrationAction::new(
            "sports_drink",
            "Sports Drink",
            "Electrolytes help retain water in your blood vessels and between cells.",
        )
        .effect(Ivf, Na, 3.0)
        .effect(Ivf, H2o, 2.0)
        .effect(Isf, H2o, 1.0)
        .hormone(Adh, -1.0),
        HydrationAction::new(
            "exercise",
            "Exercise",
            "Sweating depletes water and sodium from your interstitial fluid.",
        )
        .effect(Isf, Na, -2.0)
        .effect(Isf, H2o, -3.0)
        .effect(Ivf, H2o, -1.0)
        .hormone(Aldosterone, 2.0)
        .hormone(Adh, 2.0),
        HydrationAction::new(
            "salty_snack",
            "Salty Snack",
            "Sodium pulls water into your blood vessels, increasing thirst.",
        )
        .effect(Ivf, Na, 4.0)
        .effect(Isf, Na, 2.0)
        .hormone(Adh, 1.0),
        HydrationAction::new(
            "coffee",
            "Coffee",
            "Caffeine has a mild diuretic effect, reducing water retention.",
        )
        .effect(Ivf, H2o, -1.0)
        .effect(Isf, H2o, -1.0)
        .hormone(Adh, -2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = ActionCatalog::builtin();
        assert_eq!(catalog.len(), 11);
        let exercise = catalog.get("exercise").unwrap();
        assert_eq!(exercise.name, "Exercise");
        assert_eq!(exercise.effects[&Compartment::Isf][&Solute::H2o], -3.0);
        assert_eq!(exercise.hormones[&Hormone::Adh], 2.0);
        assert!(catalog.get("margarita").is_none());
        assert!(catalog.contains("coconut"));
        assert!(!catalog.contains("margarita"));
    }

    #[test]
    fn test_builtin_ids_unique() {
        assert!(ActionCatalog::from_actions(builtin_actions()).is_ok());
    }

    #[test]
    fn test_catalog_json_matches_builtin() {
        let from_json = ActionCatalog::from_json(CATALOG_JSON).unwrap();
        let builtin = ActionCatalog::builtin();
        assert_eq!(from_json.len(), builtin.len());
        for action in builtin.iter() {
            assert_eq!(from_json.get(action.id.as_str()), Some(action));
        }
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let a = HydrationAction::new("water", "Water", "");
        let b = HydrationAction::new("water", "More Water", "");
        match ActionCatalog::from_actions(vec![a, b]) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id.as_str(), "water"),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = HydrationAction::new("bad", "Bad", "").effect(Compartment::Ivf, Solute::Na, f64::NAN);
        assert!(matches!(
            ActionCatalog::from_actions(vec![a]),
            Err(CatalogError::NonFiniteDelta { .. })
        ));
    }

    #[test]
    fn test_unknown_compartment_rejected_at_parse() {
        let json = r#"[{"id":"x","name":"X","effects":{"GUT":{"H2O":1}},"description":""}]"#;
        assert!(matches!(
            ActionCatalog::from_json(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_negate() {
        let exercise = ActionCatalog::builtin().get("exercise").unwrap();
        let undo = negate(exercise);
        assert_eq!(undo.effects[&Compartment::Ivf][&Solute::H2o], 1.0);
        assert_eq!(undo.hormones[&Hormone::Aldosterone], -2.0);
        assert_eq!(negate(&undo).effects, exercise.effects);
    }

    #[test]
    fn test_water_delta() {
        let catalog = ActionCatalog::builtin();
        assert_eq!(catalog.get("electrolyte").unwrap().water_delta(), 3.0);
        assert_eq!(catalog.get("coffee").unwrap().water_delta(), -2.0);
    }
}
