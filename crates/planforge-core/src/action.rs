//! Instantaneous actions and their effects.

use std::fmt;
use std::sync::Arc;

use crate::error::{PlanningError, Result};
use crate::expr::{Expr, FluentExp};
use crate::types::Parameter;

/// An assignment `target := value`, applied only when `condition` holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Effect {
    target: FluentExp,
    value: Expr,
    condition: Option<Expr>,
}

impl Effect {
    /// Creates an unconditional effect.
    pub fn new(target: Expr, value: impl Into<Expr>) -> Result<Self> {
        Self::build(target, value.into(), None)
    }

    /// Creates an effect guarded by `condition`.
    pub fn conditional(condition: Expr, target: Expr, value: impl Into<Expr>) -> Result<Self> {
        let ty = condition.value_type();
        if !ty.is_bool() {
            return Err(PlanningError::type_mismatch("effect condition", "bool", ty));
        }
        Self::build(target, value.into(), Some(condition))
    }

    fn build(target: Expr, value: Expr, condition: Option<Expr>) -> Result<Self> {
        target.type_check()?;
        value.type_check()?;
        if let Some(condition) = &condition {
            condition.type_check()?;
        }
        let target = match target {
            Expr::Fluent(target) => target,
            other => {
                return Err(PlanningError::InvalidValue(format!(
                    "effect target {other} is not a fluent application"
                )))
            }
        };
        let found = value.value_type();
        if !target.value_type().accepts(&found) {
            return Err(PlanningError::type_mismatch(
                format!("effect on {target}"),
                target.value_type().to_string(),
                found,
            ));
        }
        Ok(Self {
            target,
            value,
            condition,
        })
    }

    pub fn target(&self) -> &FluentExp {
        &self.target
    }

    pub fn value(&self) -> &Expr {
        &self.value
    }

    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// All expressions of this effect, target first.
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.target
            .args()
            .iter()
            .chain(std::iter::once(&self.value))
            .chain(self.condition.as_ref())
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(condition) = &self.condition {
            write!(f, "if {condition} then ")?;
        }
        write!(f, "{} := {}", self.target, self.value)
    }
}

/// A named action template with typed parameters.
///
/// Preconditions are an implicit conjunction. Effects are applied
/// simultaneously against the state the action is executed in.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use planforge_core::{Action, Expr, Fluent, Parameter, UserType};
///
/// let location = UserType::new("Location");
/// let robot_at = Arc::new(
///     Fluent::boolean("robot_at", vec![Parameter::new("l", &location)]).unwrap(),
/// );
///
/// let mut move_action = Action::new(
///     "move",
///     vec![Parameter::new("from", &location), Parameter::new("to", &location)],
/// ).unwrap();
/// let from = move_action.parameter("from").unwrap();
/// let to = move_action.parameter("to").unwrap();
///
/// move_action.add_precondition(Expr::fluent(&robot_at, [from.clone()]).unwrap()).unwrap();
/// move_action.add_effect(Expr::fluent(&robot_at, [to]).unwrap(), true).unwrap();
/// move_action.add_effect(Expr::fluent(&robot_at, [from]).unwrap(), false).unwrap();
///
/// assert_eq!(move_action.effects().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    name: Arc<str>,
    parameters: Vec<Parameter>,
    preconditions: Vec<Expr>,
    effects: Vec<Effect>,
}

impl Action {
    /// Creates an action without preconditions or effects.
    pub fn new(name: impl Into<Arc<str>>, parameters: Vec<Parameter>) -> Result<Self> {
        let name = name.into();
        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|q| q.name() == p.name()) {
                return Err(PlanningError::DuplicateName(format!(
                    "parameter {} of action {}",
                    p.name(),
                    name
                )));
            }
        }
        Ok(Self {
            name,
            parameters,
            preconditions: Vec::new(),
            effects: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a parameter by name, ready for use in expressions.
    pub fn parameter(&self, name: &str) -> Option<Parameter> {
        self.parameters.iter().find(|p| p.name() == name).cloned()
    }

    pub fn preconditions(&self) -> &[Expr] {
        &self.preconditions
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Adds a boolean precondition over this action's parameters.
    pub fn add_precondition(&mut self, condition: Expr) -> Result<()> {
        condition.type_check()?;
        let ty = condition.value_type();
        if !ty.is_bool() {
            return Err(PlanningError::type_mismatch(
                format!("precondition of {}", self.name),
                "bool",
                ty,
            ));
        }
        condition.check_scope(&self.parameters)?;
        if !self.preconditions.contains(&condition) {
            self.preconditions.push(condition);
        }
        Ok(())
    }

    /// Adds the effect `target := value`.
    pub fn add_effect(&mut self, target: Expr, value: impl Into<Expr>) -> Result<()> {
        self.push_effect(Effect::new(target, value)?)
    }

    /// Adds the effect `target := value` guarded by `condition`.
    pub fn add_conditional_effect(
        &mut self,
        condition: Expr,
        target: Expr,
        value: impl Into<Expr>,
    ) -> Result<()> {
        self.push_effect(Effect::conditional(condition, target, value)?)
    }

    /// Adds `target := target + amount`.
    pub fn add_increase_effect(&mut self, target: Expr, amount: impl Into<Expr>) -> Result<()> {
        let value = Expr::plus(target.clone(), amount)?;
        self.add_effect(target, value)
    }

    /// Adds `target := target - amount`.
    pub fn add_decrease_effect(&mut self, target: Expr, amount: impl Into<Expr>) -> Result<()> {
        let value = Expr::minus(target.clone(), amount)?;
        self.add_effect(target, value)
    }

    /// Adds a pre-built effect.
    ///
    /// Two unconditional effects on structurally identical targets must agree
    /// on the assigned value; otherwise `ConflictingEffects` is returned and
    /// the action is left unchanged.
    pub fn push_effect(&mut self, effect: Effect) -> Result<()> {
        for expr in effect.expressions() {
            expr.check_scope(&self.parameters)?;
        }
        if !effect.is_conditional() {
            let clash = self.effects.iter().find(|e| {
                !e.is_conditional() && e.target == effect.target && e.value != effect.value
            });
            if clash.is_some() {
                return Err(PlanningError::ConflictingEffects {
                    action: self.name.to_string(),
                    target: effect.target.to_string(),
                });
            }
        }
        if !self.effects.contains(&effect) {
            self.effects.push(effect);
        }
        Ok(())
    }

    /// All expressions used by preconditions and effects.
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.preconditions
            .iter()
            .chain(self.effects.iter().flat_map(|e| e.expressions()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        writeln!(f, "action {}({}) {{", self.name, params.join(", "))?;
        writeln!(f, "    preconditions = [")?;
        for p in &self.preconditions {
            writeln!(f, "        {p}")?;
        }
        writeln!(f, "    ]")?;
        writeln!(f, "    effects = [")?;
        for e in &self.effects {
            writeln!(f, "        {e}")?;
        }
        writeln!(f, "    ]")?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::Fluent;
    use crate::types::{UserType, ValueType};

    fn setup() -> (UserType, Arc<Fluent>, Arc<Fluent>) {
        let loc = UserType::new("Location");
        let at = Arc::new(Fluent::boolean("at", vec![Parameter::new("l", &loc)]).unwrap());
        let fuel = Arc::new(Fluent::new("fuel", ValueType::int(), vec![]).unwrap());
        (loc, at, fuel)
    }

    #[test]
    fn test_precondition_must_be_boolean() {
        let (_, _, fuel) = setup();
        let mut a = Action::new("noop", vec![]).unwrap();
        let err = a
            .add_precondition(Expr::fluent(&fuel, Vec::<Expr>::new()).unwrap())
            .unwrap_err();
        assert!(matches!(err, PlanningError::TypeMismatch { .. }));
    }

    #[test]
    fn test_precondition_scope_is_checked() {
        let (loc, at, _) = setup();
        let stranger = Parameter::new("x", &loc);
        let mut a = Action::new("noop", vec![]).unwrap();
        let err = a
            .add_precondition(Expr::fluent(&at, [stranger]).unwrap())
            .unwrap_err();
        assert!(matches!(err, PlanningError::UndefinedName(_)));
    }

    #[test]
    fn test_conflicting_unconditional_effects() {
        let (loc, at, _) = setup();
        let mut a = Action::new("flip", vec![Parameter::new("l", &loc)]).unwrap();
        let l = a.parameter("l").unwrap();
        a.add_effect(Expr::fluent(&at, [l.clone()]).unwrap(), true).unwrap();
        let err = a
            .add_effect(Expr::fluent(&at, [l]).unwrap(), false)
            .unwrap_err();
        assert!(matches!(err, PlanningError::ConflictingEffects { .. }));
        assert_eq!(a.effects().len(), 1);
    }

    #[test]
    fn test_guarded_effects_may_share_target() {
        let (loc, at, _) = setup();
        let mut a = Action::new("toggle", vec![Parameter::new("l", &loc)]).unwrap();
        let l = a.parameter("l").unwrap();
        let at_l = Expr::fluent(&at, [l]).unwrap();
        a.add_conditional_effect(at_l.clone(), at_l.clone(), false).unwrap();
        a.add_conditional_effect(Expr::not(at_l.clone()).unwrap(), at_l, true)
            .unwrap();
        assert_eq!(a.effects().len(), 2);
    }

    #[test]
    fn test_effect_value_type_checked() {
        let (_, _, fuel) = setup();
        let fuel_exp = Expr::fluent(&fuel, Vec::<Expr>::new()).unwrap();
        assert!(Effect::new(fuel_exp.clone(), true).is_err());
        assert!(Effect::new(fuel_exp.clone(), Expr::real(1.5)).is_err());
        assert!(Effect::new(fuel_exp, 3).is_ok());
    }

    #[test]
    fn test_decrease_effect_builds_minus() {
        let (_, _, fuel) = setup();
        let mut a = Action::new("burn", vec![]).unwrap();
        let fuel_exp = Expr::fluent(&fuel, Vec::<Expr>::new()).unwrap();
        a.add_decrease_effect(fuel_exp.clone(), 10).unwrap();
        assert_eq!(
            a.effects()[0].value(),
            &Expr::minus(fuel_exp, 10).unwrap()
        );
    }
}
