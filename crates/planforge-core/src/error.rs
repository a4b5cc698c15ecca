//! Error types for PlanForge

use thiserror::Error;

/// Main error type for planning model operations.
///
/// Construction-time errors (`TypeMismatch`, `ArityMismatch`, ...) surface as
/// soon as an expression, action or problem element is built. The only
/// lazily detected error is `IncompleteInitialState`, raised at the first
/// solve or validate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// An operand or argument has the wrong type
    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// A fluent or action was applied to the wrong number of arguments
    #[error("Arity mismatch for {name}: expected {expected} arguments, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Reference to a type, object, fluent, action or parameter that does not exist
    #[error("Undefined name: {0}")]
    UndefinedName(String),

    /// A name is declared twice
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Two unguarded effects assign different values to the same target
    #[error("Conflicting effects on {target} in action {action}")]
    ConflictingEffects { action: String, target: String },

    /// A fluent cannot be removed while actions or goals reference it
    #[error("Fluent {fluent} is still referenced by {user}")]
    FluentInUse { fluent: String, user: String },

    /// A value is not acceptable where it was supplied
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Some ground fluents have neither an explicit nor a default initial value
    #[error(
        "Incomplete initial state: {} ground fluents have no initial value ({})",
        .missing.len(),
        .missing.join(", ")
    )]
    IncompleteInitialState { missing: Vec<String> },
}

impl PlanningError {
    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl ToString,
    ) -> Self {
        PlanningError::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

/// Result type alias for PlanForge model operations
pub type Result<T> = std::result::Result<T, PlanningError>;
