//! Plan validation.
//!
//! The validator replays a plan against a problem's formal semantics,
//! independently of any engine. Starting from the total initial state, each
//! step binds the action's parameters, checks every precondition against the
//! current state, then applies all effects simultaneously. The first failing
//! step halts the replay. After the last step the goals are checked against
//! the final state.
//!
//! Failures are data: [`validate`] only returns `Err` when the problem itself
//! is unusable (an incomplete initial state).


use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;
use crate::expr::{Binding, Expr};
use crate::plan::{ActionInstance, Plan};
use crate::problem::Problem;
use crate::semantics::{self, EvalError, TransitionError};
use crate::state::{GroundFluent, State};
use crate::types::Value;

/// Why a plan is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("step {step}: action {action} is not defined")]
    UnknownAction { step: usize, action: String },

    #[error("step {step}: invalid arguments for {action}: {reason}")]
    InvalidArguments {
        step: usize,
        action: ActionInstance,
        reason: String,
    },

    #[error("step {step}: precondition {condition} of {action} is violated")]
    PreconditionViolated {
        step: usize,
        action: ActionInstance,
        condition: Expr,
    },

    #[error("step {step}: {action} assigns both {first} and {second} to {target}")]
    ConflictingEffects {
        step: usize,
        action: ActionInstance,
        target: GroundFluent,
        first: Value,
        second: Value,
    },

    #[error("step {step}: {action} assigns {value} to {target}, outside its range")]
    ValueOutOfBounds {
        step: usize,
        action: ActionInstance,
        target: GroundFluent,
        value: Value,
    },

    /// `step` is `None` when the failure happened while checking goals.
    #[error("evaluation failed{}: {reason}", .step.map(|s| format!(" at step {s}")).unwrap_or_default())]
    EvaluationFailed {
        step: Option<usize>,
        reason: EvalError,
    },

    #[error("goal {goal} is not satisfied")]
    GoalNotSatisfied { goal: Expr },
}

impl ValidationFailure {
    /// The zero-based plan step the failure is attributed to, if any.
    pub fn step(&self) -> Option<usize> {
        match self {
            ValidationFailure::UnknownAction { step, .. }
            | ValidationFailure::InvalidArguments { step, .. }
            | ValidationFailure::PreconditionViolated { step, .. }
            | ValidationFailure::ConflictingEffects { step, .. }
            | ValidationFailure::ValueOutOfBounds { step, .. } => Some(*step),
            ValidationFailure::EvaluationFailed { step, .. } => *step,
            ValidationFailure::GoalNotSatisfied { .. } => None,
        }
    }
}

/// The verdict of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(ValidationFailure),
}

/// Verdict plus the sequence of states visited.
///
/// When traces are recorded, `trace[0]` is the initial state and `trace[i]`
/// the state after step `i - 1`; a failed run stops at the last state that
/// was reached. Otherwise the trace holds only that last state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub verdict: Verdict,
    pub trace: Vec<State>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self.verdict, Verdict::Valid)
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match &self.verdict {
            Verdict::Valid => None,
            Verdict::Invalid(failure) => Some(failure),
        }
    }

    /// The last state reached.
    pub fn final_state(&self) -> Option<&State> {
        self.trace.last()
    }
}

/// Replays plans against a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanValidator {
    record_trace: bool,
}

impl Default for PlanValidator {
    fn default() -> Self {
        Self { record_trace: true }
    }
}

impl PlanValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled, only the final state is kept in the trace.
    pub fn with_trace(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }

    /// Validates `plan` against `problem`.
    ///
    /// Returns `Err(IncompleteInitialState)` if the problem does not define
    /// every ground fluent. Every other problem with the plan is reported in
    /// the returned verdict.
    pub fn validate(&self, problem: &Problem, plan: &Plan) -> Result<ValidationResult> {
        let start = Instant::now();
        let mut current = problem.initial_state()?;
        let mut trace = Vec::new();
        if self.record_trace {
            trace.push(current.clone());
        }

        let verdict = 'replay: {
            for (step, instance) in plan.iter().enumerate() {
                debug!(event = "validation_step", step, action = %instance);
                match self.step(problem, step, instance, &current) {
                    Ok(next) => current = next,
                    Err(failure) => break 'replay Verdict::Invalid(failure),
                }
                if self.record_trace {
                    trace.push(current.clone());
                }
            }
            match check_goals(problem, &current) {
                Ok(None) => Verdict::Valid,
                Ok(Some(goal)) => Verdict::Invalid(ValidationFailure::GoalNotSatisfied {
                    goal: goal.clone(),
                }),
                Err(reason) => {
                    Verdict::Invalid(ValidationFailure::EvaluationFailed { step: None, reason })
                }
            }
        };
        if !self.record_trace {
            trace.push(current);
        }

        let valid = matches!(verdict, Verdict::Valid);
        info!(
            event = "validation_end",
            problem = problem.name(),
            steps = plan.len() as u64,
            valid = valid,
            duration_ms = start.elapsed().as_millis() as u64,
        );
        Ok(ValidationResult { verdict, trace })
    }

    fn step(
        &self,
        problem: &Problem,
        step: usize,
        instance: &ActionInstance,
        current: &State,
    ) -> std::result::Result<State, ValidationFailure> {
        let action = problem
            .action(instance.action())
            .ok_or_else(|| ValidationFailure::UnknownAction {
                step,
                action: instance.action().to_string(),
            })?;

        for arg in instance.arguments() {
            if problem.object(arg.name()) != Some(arg) {
                return Err(ValidationFailure::InvalidArguments {
                    step,
                    action: instance.clone(),
                    reason: format!("unknown object {}", arg.name()),
                });
            }
        }
        let binding = Binding::bind(action.name(), action.parameters(), instance.arguments())
            .map_err(|e| ValidationFailure::InvalidArguments {
                step,
                action: instance.clone(),
                reason: e.to_string(),
            })?;

        let eval_failed = |reason| ValidationFailure::EvaluationFailed {
            step: Some(step),
            reason,
        };
        if let Some(condition) =
            semantics::first_violated(action.preconditions(), current, &binding)
                .map_err(eval_failed)?
        {
            return Err(ValidationFailure::PreconditionViolated {
                step,
                action: instance.clone(),
                condition: condition.substitute(&binding),
            });
        }

        semantics::apply_effects(action.effects(), current, &binding).map_err(|e| match e {
            TransitionError::ConflictingEffects {
                target,
                first,
                second,
            } => ValidationFailure::ConflictingEffects {
                step,
                action: instance.clone(),
                target,
                first,
                second,
            },
            TransitionError::OutOfBounds { target, value } => ValidationFailure::ValueOutOfBounds {
                step,
                action: instance.clone(),
                target,
                value,
            },
            TransitionError::Evaluation(reason) => eval_failed(reason),
        })
    }
}

/// Validates `plan` against `problem`, recording the full trace.
pub fn validate(problem: &Problem, plan: &Plan) -> Result<ValidationResult> {
    PlanValidator::new().validate(problem, plan)
}

/// Returns the first unsatisfied goal.
pub(crate) fn check_goals<'a>(
    problem: &'a Problem,
    state: &State,
) -> std::result::Result<Option<&'a Expr>, EvalError> {
    semantics::first_violated(problem.goals(), state, &Binding::new())
}
