//! Sequential plans.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Object;

/// One plan step: an action name applied to ground arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionInstance {
    action: Arc<str>,
    arguments: Vec<Object>,
}

impl ActionInstance {
    pub fn new(action: impl Into<Arc<str>>, arguments: Vec<Object>) -> Self {
        Self {
            action: action.into(),
            arguments,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn arguments(&self) -> &[Object] {
        &self.arguments
    }
}

impl fmt::Display for ActionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<&str> = self.arguments.iter().map(|o| o.name()).collect();
        write!(f, "{}({})", self.action, args.join(", "))
    }
}

/// An immutable, ordered sequence of action instances.
///
/// # Example
///
/// ```
/// use planforge_core::{ActionInstance, Object, Plan, UserType};
///
/// let location = UserType::new("Location");
/// let l1 = Object::new("l1", &location);
/// let l2 = Object::new("l2", &location);
///
/// let plan: Plan = [ActionInstance::new("move", vec![l1, l2])].into_iter().collect();
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan.to_string(), "move(l1, l2)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plan {
    steps: Vec<ActionInstance>,
}

impl Plan {
    pub fn new(steps: Vec<ActionInstance>) -> Self {
        Self { steps }
    }

    /// The plan with no steps.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[ActionInstance] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionInstance> {
        self.steps.iter()
    }
}

impl FromIterator<ActionInstance> for Plan {
    fn from_iter<I: IntoIterator<Item = ActionInstance>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a ActionInstance;
    type IntoIter = std::slice::Iter<'a, ActionInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}
