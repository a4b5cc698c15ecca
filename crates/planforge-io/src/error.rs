//! Error types for PDDL interchange

use planforge_core::PlanningError;
use thiserror::Error;

/// Errors raised while reading or writing PDDL.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unsupported PDDL input
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The problem uses constructs PDDL cannot express
    #[error("Cannot express in PDDL: {0}")]
    Unsupported(String),

    /// The parsed text describes an ill-formed problem
    #[error(transparent)]
    Problem(#[from] PlanningError),
}

impl IoError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        IoError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for PDDL interchange
pub type Result<T> = std::result::Result<T, IoError>;
