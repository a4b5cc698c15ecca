//! Error types for PlanForge compilers

use planforge_core::{Feature, PlanningError};
use thiserror::Error;

/// Errors raised while compiling a problem or translating a plan back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilerError {
    /// The problem uses features the compiler cannot handle
    #[error("Compiler {compiler} does not support {}", join_features(.features))]
    UnsupportedProblem {
        compiler: String,
        features: Vec<Feature>,
    },

    /// A plan step names an action the translation table does not know,
    /// or with the wrong number of arguments
    #[error("Plan step {step} ({action}) cannot be translated back")]
    PlanNotTranslatable { step: usize, action: String },

    /// Building the rewritten problem failed
    #[error(transparent)]
    Problem(#[from] PlanningError),
}

fn join_features(features: &[Feature]) -> String {
    let names: Vec<&str> = features.iter().map(|f| f.as_str()).collect();
    names.join(", ")
}

/// Result type alias for compiler operations
pub type Result<T> = std::result::Result<T, CompilerError>;
