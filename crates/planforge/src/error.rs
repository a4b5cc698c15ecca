//! Error type for the PlanForge pipeline

use planforge_compiler::CompilerError;
use planforge_config::ConfigError;
use planforge_core::PlanningError;
use planforge_engine::EngineError;
use planforge_io::IoError;
use thiserror::Error;

/// Any error raised while loading, compiling, dispatching or solving.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Problem(#[from] PlanningError),

    #[error(transparent)]
    Compiler(#[from] CompilerError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
