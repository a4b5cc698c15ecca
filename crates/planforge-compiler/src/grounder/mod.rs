//! Action grounding.
//!
//! Every parameterised action is replaced by one parameterless action per
//! type-correct argument tuple, named after the action and its arguments.
//! Instances whose effects conflict once ground (say `at(x) := true` and
//! `at(y) := false` with `x == y`) can never be applied, so they are left out.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::time::Instant;

use planforge_core::{Action, Binding, Effect, Expr, Fluent, PlanningError, Problem, ProblemKind};
use tracing::{debug, info};

use crate::back_translation::{ActionTranslation, BackTranslator};
use crate::compiler::{ensure_supported, CompilationKind, CompilationResult, Compiler};
use crate::error::Result;
use crate::naming::fresh_name;

/// Replaces parameterised actions by their ground instances.
#[derive(Debug, Clone, Default)]
pub struct Grounder;

impl Grounder {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for Grounder {
    fn name(&self) -> &str {
        "grounder"
    }

    fn compilation_kind(&self) -> CompilationKind {
        CompilationKind::Grounding
    }

    fn supported_kind(&self) -> ProblemKind {
        ProblemKind::full()
    }

    fn resulting_kind(&self, kind: &ProblemKind) -> ProblemKind {
        kind.clone()
    }

    fn compile(&self, problem: &Problem) -> Result<CompilationResult> {
        ensure_supported(self, problem)?;
        let start = Instant::now();
        info!(
            event = "compile_start",
            compiler = self.name(),
            problem = problem.name(),
        );

        let mut compiled = Problem::new(problem.name());
        for ty in problem.types() {
            compiled.add_type(ty)?;
        }
        compiled.add_objects(problem.objects().iter().cloned())?;
        for fluent in problem.fluents() {
            let declared = Fluent::clone(fluent);
            match problem.fluent_default(fluent.name()) {
                Some(default) => compiled.add_fluent_with_default(declared, default.clone())?,
                None => compiled.add_fluent(declared)?,
            };
        }

        // parameterless actions keep their names
        let mut taken: HashSet<String> = problem
            .actions()
            .iter()
            .filter(|a| a.parameters().is_empty())
            .map(|a| a.name().to_string())
            .collect();
        let mut back_translator = BackTranslator::new();
        let mut skipped = 0u64;

        for action in problem.actions() {
            for arguments in problem.argument_tuples(action.parameters()) {
                let binding = Binding::bind(action.name(), action.parameters(), &arguments)?;
                let name = if arguments.is_empty() {
                    action.name().to_string()
                } else {
                    let mut base = action.name().to_string();
                    for arg in &arguments {
                        base.push('_');
                        base.push_str(arg.name());
                    }
                    fresh_name(&base, &mut taken)
                };

                match ground_action(&name, action, &binding) {
                    Ok(ground) => {
                        compiled.add_action(ground)?;
                        let translation = ActionTranslation::constant(action.name(), arguments);
                        back_translator.insert(name, translation);
                    }
                    Err(PlanningError::ConflictingEffects { target, .. }) => {
                        debug!(event = "ground_action_skipped", action = %name, target = %target);
                        skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        for (target, value) in problem.explicit_initial_values() {
            compiled.set_ground_initial_value(target.clone(), value.clone())?;
        }
        for goal in problem.goals() {
            compiled.add_goal(goal.clone())?;
        }

        info!(
            event = "compile_end",
            compiler = self.name(),
            problem = problem.name(),
            actions = compiled.actions().len() as u64,
            skipped = skipped,
            duration_ms = start.elapsed().as_millis() as u64,
        );
        Ok(CompilationResult {
            problem: compiled,
            back_translator,
        })
    }
}

fn ground_action(name: &str, action: &Action, binding: &Binding) -> planforge_core::Result<Action> {
    let mut ground = Action::new(name, Vec::new())?;
    for condition in action.preconditions() {
        ground.add_precondition(condition.substitute(binding))?;
    }
    for effect in action.effects() {
        let target = Expr::Fluent(effect.target().clone()).substitute(binding);
        let value = effect.value().substitute(binding);
        let effect = match effect.condition() {
            Some(guard) => Effect::conditional(guard.substitute(binding), target, value)?,
            None => Effect::new(target, value)?,
        };
        ground.push_effect(effect)?;
    }
    Ok(ground)
}
