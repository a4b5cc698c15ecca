//! Plan validation engine backed by the core validator.

use planforge_core::{Plan, PlanValidator, Problem, ProblemKind};
use tracing::debug;

use crate::engine::{Engine, Operation};
use crate::error::Result;
use crate::registry::EngineDescriptor;

/// Replays a plan step by step and checks the goals in the final state.
#[derive(Debug, Clone)]
pub struct SequentialPlanValidator {
    validator: PlanValidator,
}

impl Default for SequentialPlanValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialPlanValidator {
    pub const NAME: &'static str = "sequential_plan_validator";

    pub fn new() -> Self {
        Self {
            validator: PlanValidator::new().with_trace(false),
        }
    }

    /// Registration record for this engine.
    pub fn descriptor() -> EngineDescriptor {
        EngineDescriptor::new(
            Self::NAME,
            ProblemKind::full(),
            [Operation::Validate],
            |_| Box::new(Self::new()),
        )
    }
}

impl Engine for SequentialPlanValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&mut self, problem: &Problem, plan: &Plan) -> Result<bool> {
        let result = self.validator.validate(problem, plan)?;
        if let Some(failure) = result.failure() {
            debug!(event = "plan_rejected", engine = Self::NAME, reason = %failure);
        }
        Ok(result.is_valid())
    }
}
