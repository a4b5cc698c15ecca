//! The compiler abstraction.

use std::fmt;

use planforge_core::{Problem, ProblemKind};
use serde::{Deserialize, Serialize};

use crate::back_translation::BackTranslator;
use crate::error::{CompilerError, Result};

/// The family of rewrite a compiler performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilationKind {
    NegativeConditionsRemoving,
    Grounding,
}

impl fmt::Display for CompilationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilationKind::NegativeConditionsRemoving => write!(f, "NEGATIVE_CONDITIONS_REMOVING"),
            CompilationKind::Grounding => write!(f, "GROUNDING"),
        }
    }
}

/// A rewritten problem plus the table mapping its plans back.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationResult {
    pub problem: Problem,
    pub back_translator: BackTranslator,
}

/// A semantics-preserving problem-to-problem transformation.
///
/// Implementations are stateless per invocation: `compile` reads its input
/// and builds a fresh problem. Every plan valid in the result maps, through
/// the returned [`BackTranslator`], to a plan valid in the input.
pub trait Compiler: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn compilation_kind(&self) -> CompilationKind;

    /// The features this compiler accepts.
    fn supported_kind(&self) -> ProblemKind;

    fn supports(&self, kind: &ProblemKind) -> bool {
        kind.is_subset_of(&self.supported_kind())
    }

    /// The kind of the problem produced from an input of kind `kind`.
    fn resulting_kind(&self, kind: &ProblemKind) -> ProblemKind;

    fn compile(&self, problem: &Problem) -> Result<CompilationResult>;
}

/// Fails with `UnsupportedProblem` when `problem` uses features `compiler`
/// does not accept.
pub fn ensure_supported(compiler: &dyn Compiler, problem: &Problem) -> Result<()> {
    let kind = problem.kind();
    if compiler.supports(kind) {
        return Ok(());
    }
    Err(CompilerError::UnsupportedProblem {
        compiler: compiler.name().to_string(),
        features: kind.difference(&compiler.supported_kind()).features().collect(),
    })
}
