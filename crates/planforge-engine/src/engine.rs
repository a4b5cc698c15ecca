//! The engine boundary.

use std::fmt;

use planforge_core::{Plan, Problem};

use crate::error::{EngineError, Result};

/// An operation an engine can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Find a plan reaching the goals.
    Solve,
    /// Check a given plan against a problem.
    Validate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Solve => write!(f, "solve"),
            Operation::Validate => write!(f, "validate"),
        }
    }
}

/// What a planning engine reports after `solve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A plan reaching every goal.
    Solved(Plan),
    /// The reachable state space holds no goal state.
    Unsolvable,
    /// The engine gave up before deciding.
    Timeout,
}

impl SolveOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SolveOutcome::Solved(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }
}

/// A planning or validation engine.
///
/// Engines are created by the registry for a single request and handed out
/// inside an [`EngineHandle`](crate::EngineHandle); `release` runs when the
/// handle is dropped. Operations an engine does not declare keep the default
/// implementations, which fail with `UnsupportedOperation`.
pub trait Engine: Send + fmt::Debug {
    /// Registry name of this engine.
    fn name(&self) -> &str;

    fn solve(&mut self, problem: &Problem) -> Result<SolveOutcome> {
        let _ = problem;
        Err(EngineError::UnsupportedOperation {
            engine: self.name().to_string(),
            operation: Operation::Solve,
        })
    }

    /// Returns whether `plan` is valid for `problem`.
    fn validate(&mut self, problem: &Problem, plan: &Plan) -> Result<bool> {
        let _ = (problem, plan);
        Err(EngineError::UnsupportedOperation {
            engine: self.name().to_string(),
            operation: Operation::Validate,
        })
    }

    /// Teardown hook, called exactly once when the owning handle is dropped.
    fn release(&mut self) {}
}
