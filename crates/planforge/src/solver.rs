//! Planning entry points that hide the compile/dispatch/translate wiring.

use std::path::Path;
use std::time::Instant;

use planforge_compiler::{Compiler, Grounder, NegativeConditionsRemover, Pipeline};
use planforge_config::{CompilerKind, ConfigError, PlannerConfig};
use planforge_core::{Plan, PlanValidator, Problem, ProblemKind, ValidationResult};
use planforge_engine::{global, EngineRegistry, Operation, SolveOutcome};
use planforge_io::PddlReader;
use tracing::{info, warn};

use crate::error::Result;

/// Configuration file read by [`load_config`].
pub const CONFIG_FILE: &str = "planforge.toml";

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningResult {
    /// Engine outcome; a found plan is already translated back to the
    /// problem that was passed in.
    pub outcome: SolveOutcome,
    /// Name of the engine that ran.
    pub engine: String,
    /// Kind of the problem the engine saw.
    pub compiled_kind: ProblemKind,
    /// Replay of the translated plan against the input problem, when a plan
    /// was found and validation is enabled.
    pub validation: Option<ValidationResult>,
}

impl PlanningResult {
    pub fn plan(&self) -> Option<&Plan> {
        self.outcome.plan()
    }

    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }

    /// True when a plan was found and did not fail validation.
    pub fn is_valid(&self) -> bool {
        self.is_solved() && self.validation.as_ref().map_or(true, |v| v.is_valid())
    }
}

/// Reads [`CONFIG_FILE`] from the working directory, falling back to the
/// defaults when it is missing or unusable.
pub fn load_config() -> PlannerConfig {
    match PlannerConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(ConfigError::Io(_)) => PlannerConfig::default(),
        Err(err) => {
            warn!(event = "config_ignored", file = CONFIG_FILE, error = %err);
            PlannerConfig::default()
        }
    }
}

/// Builds the compiler pipeline named by `compilers`, in order.
pub fn build_pipeline(compilers: &[CompilerKind]) -> Pipeline {
    let mut pipeline = Pipeline::new();
    for kind in compilers {
        let compiler: Box<dyn Compiler> = match kind {
            CompilerKind::NegativeConditionsRemover => Box::new(NegativeConditionsRemover::new()),
            CompilerKind::Grounder => Box::new(Grounder::new()),
        };
        pipeline.push(compiler);
    }
    pipeline
}

/// Solves `problem` with the engines of the process-wide registry.
pub fn solve(problem: &Problem, config: &PlannerConfig) -> Result<PlanningResult> {
    solve_with(global(), problem, config)
}

/// Solves `problem` with an engine taken from `registry`.
///
/// Runs the configured compilers, selects an engine for the compiled kind
/// (by name when `config.engine` is set), translates a found plan back and,
/// if enabled, validates it against `problem`. The engine is released before
/// validation starts. An invalid translated plan is reported in
/// [`PlanningResult::validation`], not as an error.
pub fn solve_with(
    registry: &EngineRegistry,
    problem: &Problem,
    config: &PlannerConfig,
) -> Result<PlanningResult> {
    #[cfg(feature = "console")]
    planforge_console::init();

    let start = Instant::now();
    info!(
        event = "solve_start",
        problem = problem.name(),
        problem_kind = %problem.kind(),
        stages = config.compilers.len() as u64,
    );

    let compiled = build_pipeline(&config.compilers).compile(problem)?;
    let compiled_kind = compiled.problem.kind().clone();

    let (engine, outcome) = {
        let mut handle = match &config.engine {
            Some(name) => {
                registry.select_named(name, Operation::Solve, &compiled_kind, &config.search)?
            }
            None => registry.select_with(Operation::Solve, &compiled_kind, &config.search)?,
        };
        (handle.name().to_string(), handle.solve(&compiled.problem)?)
    };

    let outcome = match outcome {
        SolveOutcome::Solved(plan) => {
            SolveOutcome::Solved(compiled.back_translator.translate(&plan)?)
        }
        other => other,
    };

    let validation = match outcome.plan() {
        Some(plan) if config.validation.enabled => {
            let result = PlanValidator::new()
                .with_trace(config.validation.record_trace)
                .validate(problem, plan)?;
            if let Some(failure) = result.failure() {
                warn!(
                    event = "translated_plan_invalid",
                    problem = problem.name(),
                    engine = %engine,
                    failure = %failure,
                );
            }
            Some(result)
        }
        _ => None,
    };

    info!(
        event = "solve_end",
        problem = problem.name(),
        engine = %engine,
        outcome = outcome_label(&outcome),
        plan_length = outcome.plan().map_or(0, |p| p.len() as u64),
        duration_ms = start.elapsed().as_millis() as u64,
    );

    Ok(PlanningResult {
        outcome,
        engine,
        compiled_kind,
        validation,
    })
}

/// Reads a PDDL domain/problem pair and solves it.
pub fn solve_files(
    domain: impl AsRef<Path>,
    problem: impl AsRef<Path>,
    config: &PlannerConfig,
) -> Result<(Problem, PlanningResult)> {
    let problem = PddlReader::new().parse_problem(domain, problem)?;
    let result = solve(&problem, config)?;
    Ok((problem, result))
}

/// Checks `plan` against `problem` with a validating engine of the
/// process-wide registry.
pub fn validate(problem: &Problem, plan: &Plan) -> Result<bool> {
    validate_with(global(), problem, plan)
}

/// Checks `plan` against `problem` with a validating engine of `registry`.
pub fn validate_with(registry: &EngineRegistry, problem: &Problem, plan: &Plan) -> Result<bool> {
    let mut engine = registry.select(Operation::Validate, problem.kind())?;
    Ok(engine.validate(problem, plan)?)
}

fn outcome_label(outcome: &SolveOutcome) -> &'static str {
    match outcome {
        SolveOutcome::Solved(_) => "solved",
        SolveOutcome::Unsolvable => "unsolvable",
        SolveOutcome::Timeout => "timeout",
    }
}
