//! Error types for engine dispatch

use planforge_core::{Feature, PlanningError};
use thiserror::Error;

use crate::engine::Operation;

/// Errors raised by the registry and by engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No registered engine supports the operation for the problem kind
    #[error("No engine can {operation} this problem; unmet features: [{}]", join_features(.unmet))]
    NoCompatibleEngine {
        operation: Operation,
        unmet: Vec<Feature>,
    },

    /// An engine with this name is already registered
    #[error("Engine {0} is already registered")]
    DuplicateEngine(String),

    /// The registry no longer accepts registrations
    #[error("Cannot register engine {0}: registry is frozen")]
    RegistryFrozen(String),

    /// No engine is registered under this name
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// The engine does not implement the requested operation
    #[error("Engine {engine} does not support {operation}")]
    UnsupportedOperation { engine: String, operation: Operation },

    #[error(transparent)]
    Problem(#[from] PlanningError),
}

fn join_features(features: &[Feature]) -> String {
    let names: Vec<&str> = features.iter().map(|f| f.as_str()).collect();
    names.join(", ")
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
