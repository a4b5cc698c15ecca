//! Plan back-translation tables.
//!
//! A [`BackTranslator`] is an explicit mapping from the action names of a
//! rewritten problem to actions of the problem it was compiled from. Being
//! plain data, it can be inspected, serialized and tested without the
//! compiler that produced it.

use std::collections::BTreeMap;

use planforge_core::{ActionInstance, Object, Plan, Problem};
use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};

/// How a rewritten step's arguments become the original step's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentMapping {
    /// Arguments are passed through unchanged.
    Identity,
    /// The original arguments are fixed; the rewritten action has none.
    Constant(Vec<Object>),
}

/// Translation of one rewritten action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTranslation {
    pub original_action: String,
    /// Number of arguments the rewritten action takes.
    pub arity: usize,
    pub arguments: ArgumentMapping,
}

impl ActionTranslation {
    pub fn identity(original_action: impl Into<String>, arity: usize) -> Self {
        Self {
            original_action: original_action.into(),
            arity,
            arguments: ArgumentMapping::Identity,
        }
    }

    pub fn constant(original_action: impl Into<String>, arguments: Vec<Object>) -> Self {
        Self {
            original_action: original_action.into(),
            arity: 0,
            arguments: ArgumentMapping::Constant(arguments),
        }
    }
}

/// Maps plans of a rewritten problem back to its source problem.
///
/// # Example
///
/// ```
/// use planforge_compiler::{ActionTranslation, BackTranslator};
/// use planforge_core::{ActionInstance, Object, Plan, UserType};
///
/// let location = UserType::new("Location");
/// let l1 = Object::new("l1", &location);
/// let l2 = Object::new("l2", &location);
///
/// let mut table = BackTranslator::new();
/// table.insert("move_l1_l2", ActionTranslation::constant("move", vec![l1.clone(), l2.clone()]));
///
/// let grounded = Plan::new(vec![ActionInstance::new("move_l1_l2", vec![])]);
/// let original = table.translate(&grounded).unwrap();
/// assert_eq!(original.to_string(), "move(l1, l2)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackTranslator {
    table: BTreeMap<String, ActionTranslation>,
}

impl BackTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table mapping every action of `problem` to itself.
    pub fn identity(problem: &Problem) -> Self {
        let table = problem
            .actions()
            .iter()
            .map(|a| {
                (
                    a.name().to_string(),
                    ActionTranslation::identity(a.name(), a.parameters().len()),
                )
            })
            .collect();
        Self { table }
    }

    pub fn insert(&mut self, rewritten_action: impl Into<String>, translation: ActionTranslation) {
        self.table.insert(rewritten_action.into(), translation);
    }

    pub fn get(&self, rewritten_action: &str) -> Option<&ActionTranslation> {
        self.table.get(rewritten_action)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionTranslation)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Translates one step; `step` is only used for error reporting.
    pub fn translate_step(&self, step: usize, instance: &ActionInstance) -> Result<ActionInstance> {
        let not_translatable = || CompilerError::PlanNotTranslatable {
            step,
            action: instance.to_string(),
        };
        let translation = self.table.get(instance.action()).ok_or_else(not_translatable)?;
        if translation.arity != instance.arguments().len() {
            return Err(not_translatable());
        }
        let arguments = match &translation.arguments {
            ArgumentMapping::Identity => instance.arguments().to_vec(),
            ArgumentMapping::Constant(objects) => objects.clone(),
        };
        Ok(ActionInstance::new(translation.original_action.as_str(), arguments))
    }

    /// Translates a whole plan, failing on the first untranslatable step.
    pub fn translate(&self, plan: &Plan) -> Result<Plan> {
        plan.iter()
            .enumerate()
            .map(|(step, instance)| self.translate_step(step, instance))
            .collect::<Result<Vec<_>>>()
            .map(Plan::new)
    }

    /// Folds `later`, which maps a further rewritten problem onto the problem
    /// this table starts from, into a single table.
    ///
    /// Entries of `later` whose target is unknown to `self` are dropped, so
    /// plans using them fail to translate.
    pub fn compose(&self, later: &BackTranslator) -> BackTranslator {
        let table = later
            .table
            .iter()
            .filter_map(|(name, outer)| {
                let inner = self.table.get(&outer.original_action)?;
                let arguments = match (&outer.arguments, &inner.arguments) {
                    (_, ArgumentMapping::Constant(objects)) => ArgumentMapping::Constant(objects.clone()),
                    (mapping, ArgumentMapping::Identity) => mapping.clone(),
                };
                let translation = ActionTranslation {
                    original_action: inner.original_action.clone(),
                    arity: outer.arity,
                    arguments,
                };
                Some((name.clone(), translation))
            })
            .collect();
        BackTranslator { table }
    }
}
