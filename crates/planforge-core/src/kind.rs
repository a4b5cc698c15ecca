//! Problem kinds: versioned feature sets with a subset partial order.
//!
//! A [`ProblemKind`] summarises which language constructs a problem uses. It
//! is always derived from the problem, never the source of truth. Engines and
//! compilers declare the kinds they support; dispatch compares kinds with the
//! partial order defined here.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the feature vocabulary. Kinds of different versions are
/// incomparable.
pub const KIND_VERSION: u32 = 1;

/// A named language feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Problem is expressed with instantaneous actions.
    ActionBased,
    /// User types without hierarchy.
    FlatTyping,
    /// At least one user type declares a parent.
    HierarchicalTyping,
    /// A condition negates a fluent application.
    NegativeConditions,
    /// A condition contains a disjunction (or an implication).
    DisjunctiveConditions,
    /// A condition tests equality.
    Equalities,
    /// Some fluent is integer or real valued.
    NumericFluents,
    /// Some fluent is object valued.
    ObjectFluents,
    /// Integer numbers are used.
    DiscreteNumbers,
    /// Real numbers are used.
    ContinuousNumbers,
    /// Some effect is guarded by a condition.
    ConditionalEffects,
}

impl Feature {
    pub const ALL: [Feature; 11] = [
        Feature::ActionBased,
        Feature::FlatTyping,
        Feature::HierarchicalTyping,
        Feature::NegativeConditions,
        Feature::DisjunctiveConditions,
        Feature::Equalities,
        Feature::NumericFluents,
        Feature::ObjectFluents,
        Feature::DiscreteNumbers,
        Feature::ContinuousNumbers,
        Feature::ConditionalEffects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ActionBased => "ACTION_BASED",
            Feature::FlatTyping => "FLAT_TYPING",
            Feature::HierarchicalTyping => "HIERARCHICAL_TYPING",
            Feature::NegativeConditions => "NEGATIVE_CONDITIONS",
            Feature::DisjunctiveConditions => "DISJUNCTIVE_CONDITIONS",
            Feature::Equalities => "EQUALITIES",
            Feature::NumericFluents => "NUMERIC_FLUENTS",
            Feature::ObjectFluents => "OBJECT_FLUENTS",
            Feature::DiscreteNumbers => "DISCRETE_NUMBERS",
            Feature::ContinuousNumbers => "CONTINUOUS_NUMBERS",
            Feature::ConditionalEffects => "CONDITIONAL_EFFECTS",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned set of features.
///
/// # Example
///
/// ```
/// use planforge_core::{Feature, ProblemKind};
///
/// let small = ProblemKind::from_features([Feature::ActionBased]);
/// let large = ProblemKind::from_features([Feature::ActionBased, Feature::NegativeConditions]);
///
/// assert!(small.is_subset_of(&large));
/// assert!(small < large);
/// assert_eq!(large.difference(&small).features().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemKind {
    version: u32,
    features: BTreeSet<Feature>,
}

impl Default for ProblemKind {
    fn default() -> Self {
        Self {
            version: KIND_VERSION,
            features: BTreeSet::new(),
        }
    }
}

impl ProblemKind {
    /// Creates an empty kind of the current version.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_features<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        Self {
            version: KIND_VERSION,
            features: features.into_iter().collect(),
        }
    }

    /// A kind containing every known feature.
    pub fn full() -> Self {
        Self::from_features(Feature::ALL)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set(&mut self, feature: Feature) {
        self.features.insert(feature);
    }

    pub fn unset(&mut self, feature: Feature) {
        self.features.remove(&feature);
    }

    /// Builder-style `set`.
    pub fn with(mut self, feature: Feature) -> Self {
        self.set(feature);
        self
    }

    /// Builder-style `unset`.
    pub fn without(mut self, feature: Feature) -> Self {
        self.unset(feature);
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// True when both kinds share a version and every feature of `self` is
    /// in `other`.
    pub fn is_subset_of(&self, other: &ProblemKind) -> bool {
        self.version == other.version && self.features.is_subset(&other.features)
    }

    pub fn is_superset_of(&self, other: &ProblemKind) -> bool {
        other.is_subset_of(self)
    }

    pub fn union(&self, other: &ProblemKind) -> ProblemKind {
        Self {
            version: self.version.max(other.version),
            features: self.features.union(&other.features).copied().collect(),
        }
    }

    /// Features of `self` that `other` lacks.
    pub fn difference(&self, other: &ProblemKind) -> ProblemKind {
        Self {
            version: self.version,
            features: self.features.difference(&other.features).copied().collect(),
        }
    }

    pub fn has_negative_conditions(&self) -> bool {
        self.has(Feature::NegativeConditions)
    }

    pub fn has_disjunctive_conditions(&self) -> bool {
        self.has(Feature::DisjunctiveConditions)
    }

    pub fn has_equalities(&self) -> bool {
        self.has(Feature::Equalities)
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.has(Feature::ConditionalEffects)
    }

    pub fn has_numeric_fluents(&self) -> bool {
        self.has(Feature::NumericFluents)
    }
}

impl PartialOrd for ProblemKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_subset_of(other), other.is_subset_of(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.features.iter().map(|x| x.as_str()).collect();
        write!(f, "v{}{{{}}}", self.version, names.join(", "))
    }
}

impl FromIterator<Feature> for ProblemKind {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::from_features(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_order() {
        let a = ProblemKind::from_features([Feature::ActionBased, Feature::FlatTyping]);
        let b = ProblemKind::from_features([Feature::ActionBased, Feature::Equalities]);
        let ab = a.union(&b);

        assert_eq!(a.partial_cmp(&b), None);
        assert!(a < ab);
        assert!(ab > b);
        assert_eq!(a.partial_cmp(&a.clone()), Some(Ordering::Equal));
    }

    #[test]
    fn test_versions_are_incomparable() {
        let current = ProblemKind::new();
        let other = ProblemKind {
            version: KIND_VERSION + 1,
            features: BTreeSet::new(),
        };
        assert!(!current.is_subset_of(&other));
        assert_eq!(current.partial_cmp(&other), None);
    }

    #[test]
    fn test_difference() {
        let full = ProblemKind::full();
        let missing = full.difference(&ProblemKind::from_features([Feature::ActionBased]));
        assert_eq!(missing.len(), Feature::ALL.len() - 1);
        assert!(!missing.has(Feature::ActionBased));
    }

    #[test]
    fn test_display() {
        let kind = ProblemKind::from_features([Feature::NegativeConditions, Feature::ActionBased]);
        assert_eq!(kind.to_string(), "v1{ACTION_BASED, NEGATIVE_CONDITIONS}");
    }
}
