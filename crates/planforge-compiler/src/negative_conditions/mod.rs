//! Negative-condition removal.
//!
//! For every boolean fluent `f` that occurs negated in a precondition, an
//! effect guard or a goal, the compiled problem declares a shadow fluent
//! `not_f` with the same signature. The shadow starts as the negation of `f`
//! for every ground instance, and every effect on `f` is paired with the
//! opposite effect on `not_f` under the same guard, so `not_f(args) ==
//! !f(args)` holds in every reachable state. Conditions then read `not_f(args)`
//! wherever they read `not f(args)`.
//!
//! Actions keep their names and parameters, so plans translate back
//! unchanged.


use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use planforge_core::{
    Action, Effect, Expr, Feature, Fluent, FluentExp, GroundFluent, Problem, ProblemKind, Value,
};
use tracing::{debug, info};

use crate::back_translation::BackTranslator;
use crate::compiler::{ensure_supported, CompilationKind, CompilationResult, Compiler};
use crate::error::Result;
use crate::naming::fresh_name;

/// Rewrites negated fluent conditions into positive shadow fluents.
///
/// # Example
///
/// ```
/// use planforge_compiler::{Compiler, NegativeConditionsRemover};
/// use planforge_core::{Expr, Fluent, Problem};
///
/// let mut problem = Problem::new("door");
/// let open = problem
///     .add_fluent_with_default(Fluent::boolean("open", vec![]).unwrap(), false)
///     .unwrap();
/// problem
///     .add_goal(Expr::not(Expr::fluent(&open, Vec::<Expr>::new()).unwrap()).unwrap())
///     .unwrap();
/// assert!(problem.kind().has_negative_conditions());
///
/// let result = NegativeConditionsRemover::new().compile(&problem).unwrap();
/// assert!(!result.problem.kind().has_negative_conditions());
/// assert!(result.problem.fluent("not_open").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NegativeConditionsRemover;

impl NegativeConditionsRemover {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for NegativeConditionsRemover {
    fn name(&self) -> &str {
        "negative_conditions_remover"
    }

    fn compilation_kind(&self) -> CompilationKind {
        CompilationKind::NegativeConditionsRemoving
    }

    fn supported_kind(&self) -> ProblemKind {
        ProblemKind::full()
    }

    fn resulting_kind(&self, kind: &ProblemKind) -> ProblemKind {
        kind.clone().without(Feature::NegativeConditions)
    }

    fn compile(&self, problem: &Problem) -> Result<CompilationResult> {
        ensure_supported(self, problem)?;
        let start = Instant::now();
        info!(
            event = "compile_start",
            compiler = self.name(),
            problem = problem.name(),
        );

        let shadows = Shadows::plan(problem);
        let mut compiled = Problem::new(problem.name());

        for ty in problem.types() {
            compiled.add_type(ty)?;
        }
        compiled.add_objects(problem.objects().iter().cloned())?;

        for fluent in problem.fluents() {
            add_fluent_like(&mut compiled, problem, fluent, Fluent::clone(fluent), false)?;
            if let Some(shadow) = shadows.of(fluent.name()) {
                add_fluent_like(&mut compiled, problem, fluent, Fluent::clone(shadow), true)?;
            }
        }

        for action in problem.actions() {
            compiled.add_action(shadows.rewrite_action(action)?)?;
        }

        for (target, value) in problem.explicit_initial_values() {
            compiled.set_ground_initial_value(target.clone(), value.clone())?;
            if let (Some(shadow), Some(b)) = (shadows.of(target.fluent()), value.as_bool()) {
                let mirrored = GroundFluent::new(shadow.name(), target.arguments().to_vec());
                compiled.set_ground_initial_value(mirrored, Value::Bool(!b))?;
            }
        }

        for goal in problem.goals() {
            compiled.add_goal(shadows.rewrite(goal))?;
        }

        debug_assert!(!compiled.kind().has_negative_conditions());
        info!(
            event = "compile_end",
            compiler = self.name(),
            problem = problem.name(),
            fluents_added = shadows.len() as u64,
            duration_ms = start.elapsed().as_millis() as u64,
        );

        Ok(CompilationResult {
            back_translator: BackTranslator::identity(problem),
            problem: compiled,
        })
    }
}

/// Declares `declared` in `compiled` with the default of `source`, negated
/// for shadows.
fn add_fluent_like(
    compiled: &mut Problem,
    problem: &Problem,
    source: &Fluent,
    declared: Fluent,
    negate: bool,
) -> Result<()> {
    match problem.fluent_default(source.name()) {
        Some(Value::Bool(b)) if negate => {
            compiled.add_fluent_with_default(declared, !b)?;
        }
        Some(default) => {
            compiled.add_fluent_with_default(declared, default.clone())?;
        }
        None => {
            compiled.add_fluent(declared)?;
        }
    }
    Ok(())
}

/// The shadow fluents of one compilation, keyed by original fluent name.
struct Shadows {
    by_fluent: BTreeMap<String, Arc<Fluent>>,
}

impl Shadows {
    /// Picks the fluents that need a shadow and names the shadows.
    fn plan(problem: &Problem) -> Self {
        let mut negated: HashSet<String> = HashSet::new();
        let mut collect = |condition: &Expr| {
            condition.to_nnf().walk(&mut |e| {
                if let Expr::Not(inner) = e {
                    if let Expr::Fluent(f) = inner.as_ref() {
                        negated.insert(f.fluent().name().to_string());
                    }
                }
            });
        };
        for action in problem.actions() {
            action.preconditions().iter().for_each(&mut collect);
            action
                .effects()
                .iter()
                .filter_map(Effect::condition)
                .for_each(&mut collect);
        }
        problem.goals().iter().for_each(&mut collect);

        let mut taken: HashSet<String> =
            problem.fluents().iter().map(|f| f.name().to_string()).collect();
        let mut by_fluent = BTreeMap::new();
        for fluent in problem.fluents() {
            if negated.contains(fluent.name()) && fluent.value_type().is_bool() {
                let name = fresh_name(&format!("not_{}", fluent.name()), &mut taken);
                debug!(event = "shadow_fluent", fluent = fluent.name(), shadow = %name);
                by_fluent.insert(fluent.name().to_string(), Arc::new(fluent.renamed(name)));
            }
        }
        Self { by_fluent }
    }

    fn of(&self, fluent: &str) -> Option<&Arc<Fluent>> {
        self.by_fluent.get(fluent)
    }

    fn len(&self) -> usize {
        self.by_fluent.len()
    }

    fn shadow_application(&self, application: &FluentExp) -> Option<Expr> {
        let shadow = self.of(application.fluent().name())?;
        let args = application.args().iter().map(|a| self.rewrite(a));
        match Expr::fluent(shadow, args) {
            Ok(expr) => Some(expr),
            Err(e) => unreachable!("shadow of {application} has the same signature: {e}"),
        }
    }

    fn mentions_shadowed(&self, expr: &Expr) -> bool {
        expr.fluent_applications()
            .iter()
            .any(|f| self.by_fluent.contains_key(f.fluent().name()))
    }

    /// Replaces every negated shadowed fluent application in `condition`.
    ///
    /// Compound negations and implications over shadowed fluents are first
    /// pushed to negation normal form; every other subtree is kept as is.
    fn rewrite(&self, condition: &Expr) -> Expr {
        condition.transform(&mut |node| match node {
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Fluent(f) => self.shadow_application(f),
                Expr::And(_) | Expr::Or(_) | Expr::Not(_) | Expr::Implies(..)
                    if self.mentions_shadowed(node) =>
                {
                    Some(self.rewrite(&node.to_nnf()))
                }
                _ => None,
            },
            Expr::Implies(..) if self.mentions_shadowed(node) => Some(self.rewrite(&node.to_nnf())),
            _ => None,
        })
    }

    fn rewrite_action(&self, action: &Action) -> Result<Action> {
        let mut rewritten = Action::new(action.name(), action.parameters().to_vec())?;
        for condition in action.preconditions() {
            rewritten.add_precondition(self.rewrite(condition))?;
        }
        for effect in action.effects() {
            let guard = effect.condition().map(|g| self.rewrite(g));
            let target = Expr::Fluent(effect.target().clone());
            let original = build_effect(guard.clone(), target, effect.value().clone())?;

            // the pair is built in full before either half is added
            let mirrored = match self.shadow_application(effect.target()) {
                Some(shadow) => Some(build_effect(guard, shadow, negate(effect.value()))?),
                None => None,
            };
            rewritten.push_effect(original)?;
            if let Some(mirrored) = mirrored {
                rewritten.push_effect(mirrored)?;
            }
        }
        Ok(rewritten)
    }
}

fn build_effect(guard: Option<Expr>, target: Expr, value: Expr) -> planforge_core::Result<Effect> {
    match guard {
        Some(guard) => Effect::conditional(guard, target, value),
        None => Effect::new(target, value),
    }
}

fn negate(value: &Expr) -> Expr {
    match value {
        Expr::Bool(b) => Expr::Bool(!b),
        Expr::Not(inner) => (**inner).clone(),
        other => Expr::Not(Box::new(other.clone())),
    }
}
