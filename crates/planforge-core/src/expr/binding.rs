//! Parameter bindings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PlanningError, Result};
use crate::types::{Object, Parameter, ValueType};

/// Maps parameter names to the objects they are bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: BTreeMap<Arc<str>, Object>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `parameters` positionally to `arguments`, checking arity and types.
    pub fn bind(owner: &str, parameters: &[Parameter], arguments: &[Object]) -> Result<Self> {
        if parameters.len() != arguments.len() {
            return Err(PlanningError::ArityMismatch {
                name: owner.to_string(),
                expected: parameters.len(),
                found: arguments.len(),
            });
        }
        let mut binding = Self::new();
        for (param, arg) in parameters.iter().zip(arguments) {
            if !arg.user_type().is_subtype_of(param.user_type()) {
                return Err(PlanningError::type_mismatch(
                    format!("parameter {} of {}", param.name(), owner),
                    ValueType::Object(param.user_type().clone()).to_string(),
                    arg.user_type(),
                ));
            }
            binding.insert(param, arg.clone());
        }
        Ok(binding)
    }

    pub fn insert(&mut self, parameter: &Parameter, object: Object) {
        self.values.insert(Arc::from(parameter.name()), object);
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
