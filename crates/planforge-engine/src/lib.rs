//! PlanForge Engine - capability-based engine dispatch
//!
//! Engines declare the problem kinds and operations they support when they
//! are registered. Callers ask the [`EngineRegistry`] for an engine by
//! operation and problem kind and receive an [`EngineHandle`] that releases
//! the engine when dropped.
//!
//! ```
//! use planforge_engine::{global, Operation};
//! use planforge_core::ProblemKind;
//!
//! let handle = global().select(Operation::Validate, &ProblemKind::new()).unwrap();
//! assert_eq!(handle.name(), "sequential_plan_validator");
//! ```

pub mod builtin;
pub mod engine;
pub mod error;
pub mod registry;

pub use builtin::{BreadthFirstPlanner, SequentialPlanValidator};
pub use engine::{Engine, Operation, SolveOutcome};
pub use error::{EngineError, Result};
pub use registry::{global, EngineDescriptor, EngineFactory, EngineHandle, EngineRegistry};
