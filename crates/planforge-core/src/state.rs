//! Ground fluents and total state snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Object, Value};

/// A fluent applied to concrete objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroundFluent {
    fluent: Arc<str>,
    arguments: Vec<Object>,
}

impl GroundFluent {
    pub fn new(fluent: impl Into<Arc<str>>, arguments: Vec<Object>) -> Self {
        Self {
            fluent: fluent.into(),
            arguments,
        }
    }

    pub fn fluent(&self) -> &str {
        &self.fluent
    }

    pub fn arguments(&self) -> &[Object] {
        &self.arguments
    }
}

impl fmt::Display for GroundFluent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fluent)?;
        if !self.arguments.is_empty() {
            let args: Vec<&str> = self.arguments.iter().map(|o| o.name()).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// A total assignment of values to ground fluents.
///
/// Ordered so that traces print and compare deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    values: BTreeMap<GroundFluent, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fluent: &GroundFluent) -> Option<&Value> {
        self.values.get(fluent)
    }

    /// Looks a value up by fluent and argument names.
    pub fn value_of(&self, fluent: &str, arguments: &[&str]) -> Option<&Value> {
        self.values.iter().find_map(|(k, v)| {
            let matches = k.fluent() == fluent
                && k.arguments().len() == arguments.len()
                && k.arguments().iter().zip(arguments).all(|(o, n)| o.name() == *n);
            matches.then_some(v)
        })
    }

    pub fn set(&mut self, fluent: GroundFluent, value: Value) {
        self.values.insert(fluent, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroundFluent, &Value)> {
        self.values.iter()
    }
}

impl FromIterator<(GroundFluent, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (GroundFluent, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|(k, v)| format!("{k} = {v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
