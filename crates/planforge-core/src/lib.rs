//! PlanForge Core - Core types for classical planning
//!
//! This crate provides the fundamental abstractions for PlanForge:
//! - Typed objects, fluents and values
//! - Immutable, type-checked expression trees
//! - Actions, problems and the derived problem kind
//! - Plans, ground states and the plan validator

pub mod action;
pub mod error;
pub mod expr;
pub mod fluent;
pub mod kind;
pub mod plan;
pub mod problem;
pub mod semantics;
pub mod state;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use action::{Action, Effect};
pub use error::{PlanningError, Result};
pub use expr::{Binding, Expr, FluentExp};
pub use fluent::Fluent;
pub use kind::{Feature, ProblemKind, KIND_VERSION};
pub use plan::{ActionInstance, Plan};
pub use problem::Problem;
pub use state::{GroundFluent, State};
pub use types::{Object, Parameter, UserType, Value, ValueType};
pub use validation::{validate, PlanValidator, ValidationFailure, ValidationResult, Verdict};
