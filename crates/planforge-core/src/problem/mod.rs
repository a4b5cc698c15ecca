//! The planning problem.
//!
//! A [`Problem`] owns its types, objects, fluents, actions, initial values and
//! goals. Cloning a problem copies all of them; fluents are shared through
//! `Arc` but are immutable, so the copy is indistinguishable from a deep one.
//!
//! Every mutation is checked immediately, except completeness of the initial
//! state, which is only checked by [`Problem::initial_state`] because fluents
//! and objects may be added incrementally.

mod kind;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::action::Action;
use crate::error::{PlanningError, Result};
use crate::expr::Expr;
use crate::fluent::Fluent;
use crate::kind::ProblemKind;
use crate::state::{GroundFluent, State};
use crate::types::{Object, Parameter, UserType, Value};

/// A classical planning problem.
///
/// # Example
///
/// ```
/// use planforge_core::{Fluent, Expr, Object, Parameter, Problem, UserType};
///
/// let location = UserType::new("Location");
/// let mut problem = Problem::new("robot");
///
/// let robot_at = problem
///     .add_fluent_with_default(
///         Fluent::boolean("robot_at", vec![Parameter::new("l", &location)]).unwrap(),
///         false,
///     )
///     .unwrap();
/// let l1 = Object::new("l1", &location);
/// problem.add_object(l1.clone()).unwrap();
///
/// problem.set_initial_value(Expr::fluent(&robot_at, [&l1]).unwrap(), true).unwrap();
/// problem.add_goal(Expr::fluent(&robot_at, [&l1]).unwrap()).unwrap();
///
/// assert!(problem.initial_state().is_ok());
/// assert!(!problem.kind().has_negative_conditions());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Problem {
    name: String,
    types: Vec<UserType>,
    objects: Vec<Object>,
    fluents: Vec<Arc<Fluent>>,
    fluent_defaults: BTreeMap<Arc<str>, Value>,
    actions: Vec<Action>,
    initial_values: BTreeMap<GroundFluent, Value>,
    goals: Vec<Expr>,
    kind_cache: OnceLock<ProblemKind>,
}

impl Problem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // Types and objects

    /// Declares a user type, together with its ancestors.
    ///
    /// Re-adding an identical type is a no-op; a different type under an
    /// existing name is a `DuplicateName`.
    pub fn add_type(&mut self, ty: &UserType) -> Result<()> {
        let chain: Vec<&UserType> = ty.ancestors().collect();
        for t in chain.into_iter().rev() {
            match self.types.iter().find(|known| known.name() == t.name()) {
                Some(known) if known == t => {}
                Some(_) => return Err(PlanningError::DuplicateName(format!("type {}", t.name()))),
                None => {
                    self.types.push(t.clone());
                    self.invalidate();
                }
            }
        }
        Ok(())
    }

    pub fn types(&self) -> &[UserType] {
        &self.types
    }

    pub fn user_type(&self, name: &str) -> Option<&UserType> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn add_object(&mut self, object: Object) -> Result<()> {
        if self.objects.iter().any(|o| o.name() == object.name()) {
            return Err(PlanningError::DuplicateName(format!("object {}", object.name())));
        }
        self.add_type(object.user_type())?;
        self.objects.push(object);
        self.invalidate();
        Ok(())
    }

    pub fn add_objects<I: IntoIterator<Item = Object>>(&mut self, objects: I) -> Result<()> {
        for object in objects {
            self.add_object(object)?;
        }
        Ok(())
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Objects of `ty` or any of its subtypes, in declaration order.
    pub fn objects_of(&self, ty: &UserType) -> Vec<&Object> {
        self.objects
            .iter()
            .filter(|o| o.user_type().is_subtype_of(ty))
            .collect()
    }

    // Fluents

    /// Declares a fluent and returns the shared handle used in expressions.
    pub fn add_fluent(&mut self, fluent: Fluent) -> Result<Arc<Fluent>> {
        if self.fluent(fluent.name()).is_some() {
            return Err(PlanningError::DuplicateName(format!("fluent {}", fluent.name())));
        }
        for param in fluent.parameters() {
            self.add_type(param.user_type())?;
        }
        if let Some(ty) = fluent.value_type().as_user_type() {
            self.add_type(ty)?;
        }
        let fluent = Arc::new(fluent);
        self.fluents.push(Arc::clone(&fluent));
        self.invalidate();
        Ok(fluent)
    }

    /// Declares a fluent whose ground instances start at `default` unless
    /// given an explicit initial value.
    pub fn add_fluent_with_default(
        &mut self,
        fluent: Fluent,
        default: impl Into<Value>,
    ) -> Result<Arc<Fluent>> {
        let default = default.into();
        let coerced = fluent.value_type().coerce(default.clone()).ok_or_else(|| {
            PlanningError::InvalidValue(format!(
                "default {default} does not fit fluent {}",
                fluent
            ))
        })?;
        let fluent = self.add_fluent(fluent)?;
        self.fluent_defaults.insert(Arc::from(fluent.name()), coerced);
        Ok(fluent)
    }

    pub fn fluents(&self) -> &[Arc<Fluent>] {
        &self.fluents
    }

    pub fn fluent(&self, name: &str) -> Option<&Arc<Fluent>> {
        self.fluents.iter().find(|f| f.name() == name)
    }

    pub fn fluent_default(&self, name: &str) -> Option<&Value> {
        self.fluent_defaults.get(name)
    }

    /// Removes a fluent that no action or goal references.
    ///
    /// Initial values of the fluent are dropped with it.
    pub fn remove_fluent(&mut self, name: &str) -> Result<Arc<Fluent>> {
        let index = self
            .fluents
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| PlanningError::UndefinedName(format!("fluent {name}")))?;

        let mentions = |e: &Expr| e.fluent_applications().iter().any(|f| f.fluent().name() == name);
        let used_by = |a: &Action| {
            a.expressions().any(|e| mentions(e))
                || a.effects().iter().any(|e| e.target().fluent().name() == name)
        };
        if let Some(action) = self.actions.iter().find(|a| used_by(a)) {
            return Err(PlanningError::FluentInUse {
                fluent: name.to_string(),
                user: format!("action {}", action.name()),
            });
        }
        if let Some(goal) = self.goals.iter().find(|g| mentions(g)) {
            return Err(PlanningError::FluentInUse {
                fluent: name.to_string(),
                user: format!("goal {goal}"),
            });
        }

        let removed = self.fluents.remove(index);
        self.fluent_defaults.remove(name);
        self.initial_values.retain(|k, _| k.fluent() != name);
        self.invalidate();
        Ok(removed)
    }

    // Actions

    /// Adds an action whose fluents and object constants all belong to this
    /// problem.
    pub fn add_action(&mut self, action: Action) -> Result<()> {
        if self.action(action.name()).is_some() {
            return Err(PlanningError::DuplicateName(format!("action {}", action.name())));
        }
        for expr in action.expressions() {
            expr.type_check()?;
            self.check_symbols(expr)?;
        }
        for effect in action.effects() {
            self.check_fluent(effect.target().fluent())?;
        }
        for param in action.parameters() {
            self.add_type(param.user_type())?;
        }
        self.actions.push(action);
        self.invalidate();
        Ok(())
    }

    pub fn remove_action(&mut self, name: &str) -> Result<Action> {
        let index = self
            .actions
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| PlanningError::UndefinedName(format!("action {name}")))?;
        self.invalidate();
        Ok(self.actions.remove(index))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name() == name)
    }

    // Initial state

    /// Sets the initial value of a ground fluent application.
    pub fn set_initial_value(&mut self, target: Expr, value: impl Into<Expr>) -> Result<()> {
        let value = value.into();
        target.type_check()?;
        let Expr::Fluent(application) = &target else {
            return Err(PlanningError::InvalidValue(format!(
                "initial value target {target} is not a fluent application"
            )));
        };
        let mut arguments = Vec::with_capacity(application.args().len());
        for arg in application.args() {
            match arg {
                Expr::Object(o) => arguments.push(o.clone()),
                other => {
                    return Err(PlanningError::InvalidValue(format!(
                        "initial value target argument {other} is not an object"
                    )))
                }
            }
        }
        let constant = value.as_constant().ok_or_else(|| {
            PlanningError::InvalidValue(format!("initial value {value} is not a constant"))
        })?;
        let ground = GroundFluent::new(application.fluent().name(), arguments);
        self.set_ground_initial_value(ground, constant)
    }

    /// Sets the initial value of an already ground fluent.
    pub fn set_ground_initial_value(&mut self, target: GroundFluent, value: Value) -> Result<()> {
        let fluent = self
            .fluent(target.fluent())
            .ok_or_else(|| PlanningError::UndefinedName(format!("fluent {}", target.fluent())))?;
        if fluent.arity() != target.arguments().len() {
            return Err(PlanningError::ArityMismatch {
                name: fluent.name().to_string(),
                expected: fluent.arity(),
                found: target.arguments().len(),
            });
        }
        for (param, arg) in fluent.parameters().iter().zip(target.arguments()) {
            if !self.objects.contains(arg) {
                return Err(PlanningError::UndefinedName(format!("object {}", arg.name())));
            }
            if !arg.user_type().is_subtype_of(param.user_type()) {
                return Err(PlanningError::type_mismatch(
                    format!("argument {} of {}", param.name(), fluent.name()),
                    param.user_type().to_string(),
                    arg.user_type(),
                ));
            }
        }
        let coerced = fluent.value_type().coerce(value.clone()).ok_or_else(|| {
            PlanningError::type_mismatch(
                format!("initial value of {target}"),
                fluent.value_type().to_string(),
                value,
            )
        })?;
        self.initial_values.insert(target, coerced);
        Ok(())
    }

    /// Explicitly set initial values, without defaults.
    pub fn explicit_initial_values(&self) -> impl Iterator<Item = (&GroundFluent, &Value)> {
        self.initial_values.iter()
    }

    /// The explicit initial value of `fluent`, falling back to its default.
    pub fn initial_value(&self, fluent: &GroundFluent) -> Option<&Value> {
        self.initial_values
            .get(fluent)
            .or_else(|| self.fluent_defaults.get(fluent.fluent()))
    }

    /// Builds the total initial state.
    ///
    /// Fails with `IncompleteInitialState` listing every ground fluent that
    /// has neither an explicit value nor a default.
    pub fn initial_state(&self) -> Result<State> {
        let mut state = State::new();
        let mut missing = Vec::new();
        for fluent in &self.fluents {
            for ground in self.ground_applications(fluent) {
                match self.initial_value(&ground) {
                    Some(value) => state.set(ground, value.clone()),
                    None => missing.push(ground.to_string()),
                }
            }
        }
        if missing.is_empty() {
            Ok(state)
        } else {
            Err(PlanningError::IncompleteInitialState { missing })
        }
    }

    // Goals

    /// Adds a ground boolean goal conjunct.
    pub fn add_goal(&mut self, goal: Expr) -> Result<()> {
        goal.type_check()?;
        let ty = goal.value_type();
        if !ty.is_bool() {
            return Err(PlanningError::type_mismatch("goal", "bool", ty));
        }
        if !goal.is_ground() {
            return Err(PlanningError::InvalidValue(format!("goal {goal} is not ground")));
        }
        self.check_symbols(&goal)?;
        if !self.goals.contains(&goal) {
            self.goals.push(goal);
            self.invalidate();
        }
        Ok(())
    }

    pub fn goals(&self) -> &[Expr] {
        &self.goals
    }

    pub fn clear_goals(&mut self) {
        self.goals.clear();
        self.invalidate();
    }

    // Grounding helpers

    /// Every type-correct tuple of objects for `parameters`, in declaration
    /// order (the last parameter varies fastest).
    pub fn argument_tuples(&self, parameters: &[Parameter]) -> Vec<Vec<Object>> {
        let mut tuples: Vec<Vec<Object>> = vec![Vec::new()];
        for param in parameters {
            let candidates = self.objects_of(param.user_type());
            tuples = tuples
                .into_iter()
                .flat_map(|prefix| {
                    candidates.iter().map(move |o| {
                        let mut tuple = prefix.clone();
                        tuple.push((*o).clone());
                        tuple
                    })
                })
                .collect();
        }
        tuples
    }

    /// Every ground instance of `fluent` over this problem's objects.
    pub fn ground_applications(&self, fluent: &Fluent) -> Vec<GroundFluent> {
        self.argument_tuples(fluent.parameters())
            .into_iter()
            .map(|args| GroundFluent::new(fluent.name(), args))
            .collect()
    }

    // Kind

    /// The feature summary of this problem, computed on first use after
    /// every mutation.
    pub fn kind(&self) -> &ProblemKind {
        self.kind_cache.get_or_init(|| kind::compute(self))
    }

    fn invalidate(&mut self) {
        self.kind_cache = OnceLock::new();
    }

    fn check_fluent(&self, fluent: &Fluent) -> Result<()> {
        match self.fluent(fluent.name()) {
            Some(known) if **known == *fluent => Ok(()),
            Some(_) => Err(PlanningError::InvalidValue(format!(
                "fluent {} differs from the declared signature",
                fluent.name()
            ))),
            None => Err(PlanningError::UndefinedName(format!("fluent {}", fluent.name()))),
        }
    }

    fn check_symbols(&self, expr: &Expr) -> Result<()> {
        let mut result = Ok(());
        expr.walk(&mut |e| {
            if result.is_err() {
                return;
            }
            match e {
                Expr::Fluent(f) => result = self.check_fluent(f.fluent()),
                Expr::Object(o) if !self.objects.contains(o) => {
                    result = Err(PlanningError::UndefinedName(format!("object {}", o.name())));
                }
                _ => {}
            }
        });
        result
    }
}

impl PartialEq for Problem {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.types == other.types
            && self.objects == other.objects
            && self.fluents == other.fluents
            && self.fluent_defaults == other.fluent_defaults
            && self.actions == other.actions
            && self.initial_values == other.initial_values
            && self.goals == other.goals
    }
}

impl Eq for Problem {}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "problem name = {}", self.name)?;
        writeln!(f)?;
        let types: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
        writeln!(f, "types = [{}]", types.join(", "))?;
        writeln!(f)?;
        writeln!(f, "fluents = [")?;
        for fluent in &self.fluents {
            writeln!(f, "  {fluent}")?;
        }
        writeln!(f, "]")?;
        writeln!(f)?;
        writeln!(f, "actions = [")?;
        for action in &self.actions {
            for line in action.to_string().lines() {
                writeln!(f, "  {line}")?;
            }
        }
        writeln!(f, "]")?;
        writeln!(f)?;
        let objects: Vec<String> = self
            .objects
            .iter()
            .map(|o| format!("{} - {}", o.name(), o.user_type()))
            .collect();
        writeln!(f, "objects = [{}]", objects.join(", "))?;
        writeln!(f)?;
        writeln!(f, "initial values = [")?;
        for (fluent, value) in &self.initial_values {
            writeln!(f, "  {fluent} := {value}")?;
        }
        writeln!(f, "]")?;
        writeln!(f)?;
        writeln!(f, "goals = [")?;
        for goal in &self.goals {
            writeln!(f, "  {goal}")?;
        }
        write!(f, "]")
    }
}
