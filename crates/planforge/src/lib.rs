//! PlanForge - A classical planning toolkit in Rust
//!
//! Build a problem, pick a configuration and call [`solve`]: the configured
//! compiler pipeline rewrites the problem, the engine registry picks the
//! closest engine for what is left, and the plan it finds is translated back
//! and validated against the problem you wrote.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! let mut problem = Problem::new("door");
//! let open = problem
//!     .add_fluent_with_default(Fluent::boolean("open", vec![]).unwrap(), false)
//!     .unwrap();
//! let is_open = Expr::fluent(&open, Vec::<Expr>::new()).unwrap();
//!
//! let mut open_door = Action::new("open_door", vec![]).unwrap();
//! open_door.add_precondition(Expr::not(is_open.clone()).unwrap()).unwrap();
//! open_door.add_effect(is_open.clone(), true).unwrap();
//! problem.add_action(open_door).unwrap();
//! problem.add_goal(is_open).unwrap();
//!
//! let result = solve(&problem, &PlannerConfig::default()).unwrap();
//! assert_eq!(result.engine, "breadth_first");
//! assert_eq!(result.plan().unwrap().to_string(), "open_door()");
//! assert!(result.is_valid());
//! ```

pub mod error;
mod solver;

pub use error::{PipelineError, Result};
pub use solver::{
    build_pipeline, load_config, solve, solve_files, solve_with, validate, validate_with,
    PlanningResult, CONFIG_FILE,
};

pub use planforge_compiler::{CompilationResult, CompilerError};
pub use planforge_config::{ConfigError, SearchConfig, ValidationConfig};
pub use planforge_core::{PlanningError, ValidationFailure, ValidationResult, Verdict};
pub use planforge_engine::{global, EngineDescriptor, EngineError, EngineHandle, EngineRegistry};
pub use planforge_io::IoError;

#[cfg(feature = "console")]
pub use planforge_console as console;

pub mod prelude {
    pub use planforge_compiler::{
        BackTranslator, Compiler, Grounder, NegativeConditionsRemover, Pipeline,
    };
    pub use planforge_config::{CompilerKind, PlannerConfig};
    pub use planforge_core::{
        Action, ActionInstance, Expr, Feature, Fluent, Object, Parameter, Plan, PlanValidator,
        Problem, ProblemKind, UserType, Value, ValueType,
    };
    pub use planforge_engine::{Engine, Operation, SolveOutcome};
    pub use planforge_io::{PddlReader, PddlWriter};

    pub use super::{solve, validate, PipelineError, PlanningResult};
}
