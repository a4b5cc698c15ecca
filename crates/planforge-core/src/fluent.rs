//! Fluent declarations.

use std::fmt;
use std::sync::Arc;

use crate::error::{PlanningError, Result};
use crate::types::{Parameter, ValueType};

/// A named, typed state variable parameterized over user types.
///
/// The signature (parameter types and value type) is fixed at creation.
/// Problems and expressions share fluents through `Arc<Fluent>`; since a
/// fluent never changes after construction, sharing is indistinguishable from
/// copying.
///
/// # Example
///
/// ```
/// use planforge_core::{Fluent, Parameter, UserType, ValueType};
///
/// let location = UserType::new("Location");
/// let robot_at = Fluent::new(
///     "robot_at",
///     ValueType::Bool,
///     vec![Parameter::new("location", &location)],
/// ).unwrap();
///
/// assert_eq!(robot_at.arity(), 1);
/// assert_eq!(robot_at.to_string(), "bool robot_at(location - Location)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fluent {
    name: Arc<str>,
    value_type: ValueType,
    parameters: Vec<Parameter>,
}

impl Fluent {
    /// Creates a fluent; parameter names must be distinct.
    pub fn new(
        name: impl Into<Arc<str>>,
        value_type: ValueType,
        parameters: Vec<Parameter>,
    ) -> Result<Self> {
        let name = name.into();
        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|q| q.name() == p.name()) {
                return Err(PlanningError::DuplicateName(format!(
                    "parameter {} of fluent {}",
                    p.name(),
                    name
                )));
            }
        }
        Ok(Self {
            name,
            value_type,
            parameters,
        })
    }

    /// Shorthand for a boolean fluent.
    pub fn boolean(name: impl Into<Arc<str>>, parameters: Vec<Parameter>) -> Result<Self> {
        Self::new(name, ValueType::Bool, parameters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Returns a fluent with the same signature under another name.
    pub fn renamed(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value_type: self.value_type.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Display for Fluent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value_type, self.name)?;
        if !self.parameters.is_empty() {
            let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}
