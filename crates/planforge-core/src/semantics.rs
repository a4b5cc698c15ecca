//! Ground evaluation and state transitions.
//!
//! These functions give expressions and effects their meaning over a
//! [`State`]. They are shared by the plan validator and by search engines, so
//! both agree on what an action does.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::action::Effect;
use crate::expr::{Binding, Expr, FluentExp};
use crate::state::{GroundFluent, State};
use crate::types::Value;

/// Reasons an expression cannot be evaluated in a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("parameter {0} is not bound")]
    Unbound(String),

    #[error("{0} has no value in the current state")]
    MissingValue(GroundFluent),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("ill-typed operand: {0}")]
    TypeMismatch(String),
}

/// Reasons a set of effects cannot be applied to a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("effects assign both {first} and {second} to {target}")]
    ConflictingEffects {
        target: GroundFluent,
        first: Value,
        second: Value,
    },

    #[error("value {value} is outside the range of {target}")]
    OutOfBounds { target: GroundFluent, value: Value },

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Evaluates `expr` in `state` with parameters taken from `binding`.
pub fn evaluate(expr: &Expr, state: &State, binding: &Binding) -> Result<Value, EvalError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(i) => Ok(Value::Int(*i)),
        Expr::Real(r) => Ok(Value::Real(*r)),
        Expr::Object(o) => Ok(Value::Object(o.clone())),
        Expr::Param(p) => binding
            .get(p.name())
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| EvalError::Unbound(p.name().to_string())),
        Expr::Fluent(f) => {
            let ground = ground_fluent(f, state, binding)?;
            state
                .get(&ground)
                .cloned()
                .ok_or(EvalError::MissingValue(ground))
        }
        Expr::And(xs) => {
            for x in xs {
                if !holds(x, state, binding)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Expr::Or(xs) => {
            for x in xs {
                if holds(x, state, binding)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Expr::Not(x) => Ok(Value::Bool(!holds(x, state, binding)?)),
        Expr::Implies(l, r) => {
            let result = !holds(l, state, binding)? || holds(r, state, binding)?;
            Ok(Value::Bool(result))
        }
        Expr::Eq(l, r) => {
            let (l, r) = (evaluate(l, state, binding)?, evaluate(r, state, binding)?);
            Ok(Value::Bool(l.semantically_equals(&r)))
        }
        Expr::Lt(l, r) => compare(l, r, state, binding, |o| o.is_lt()),
        Expr::Le(l, r) => compare(l, r, state, binding, |o| o.is_le()),
        Expr::Gt(l, r) => compare(l, r, state, binding, |o| o.is_gt()),
        Expr::Ge(l, r) => compare(l, r, state, binding, |o| o.is_ge()),
        Expr::Plus(l, r) => arithmetic(l, r, state, binding, i64::checked_add, |a, b| a + b),
        Expr::Minus(l, r) => arithmetic(l, r, state, binding, i64::checked_sub, |a, b| a - b),
        Expr::Times(l, r) => arithmetic(l, r, state, binding, i64::checked_mul, |a, b| a * b),
        Expr::Div(l, r) => {
            let l = number(evaluate(l, state, binding)?)?;
            let r = number(evaluate(r, state, binding)?)?;
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::real(l / r))
        }
    }
}

/// Evaluates a boolean expression.
pub fn holds(expr: &Expr, state: &State, binding: &Binding) -> Result<bool, EvalError> {
    let value = evaluate(expr, state, binding)?;
    value
        .as_bool()
        .ok_or_else(|| EvalError::TypeMismatch(format!("{expr} evaluated to {value}")))
}

/// Resolves the arguments of a fluent application to objects.
pub fn ground_fluent(
    fluent: &FluentExp,
    state: &State,
    binding: &Binding,
) -> Result<GroundFluent, EvalError> {
    let mut arguments = Vec::with_capacity(fluent.args().len());
    for arg in fluent.args() {
        match evaluate(arg, state, binding)? {
            Value::Object(o) => arguments.push(o),
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "argument {arg} of {} evaluated to {other}",
                    fluent.fluent().name()
                )))
            }
        }
    }
    Ok(GroundFluent::new(fluent.fluent().name(), arguments))
}

/// Returns the first condition that does not hold, if any.
pub fn first_violated<'a>(
    conditions: &'a [Expr],
    state: &State,
    binding: &Binding,
) -> Result<Option<&'a Expr>, EvalError> {
    for condition in conditions {
        if !holds(condition, state, binding)? {
            return Ok(Some(condition));
        }
    }
    Ok(None)
}

/// Applies `effects` simultaneously to `state`.
///
/// Guards, targets and values are all evaluated against `state`; no effect
/// observes another effect's assignment. Effects whose guard is false are
/// skipped. Values are coerced to the target fluent's type, so an integer
/// written to a real fluent is stored as a real.
pub fn apply_effects(
    effects: &[Effect],
    state: &State,
    binding: &Binding,
) -> Result<State, TransitionError> {
    let mut assignments: BTreeMap<GroundFluent, Value> = BTreeMap::new();

    for effect in effects {
        if let Some(guard) = effect.condition() {
            if !holds(guard, state, binding)? {
                continue;
            }
        }
        let target = ground_fluent(effect.target(), state, binding)?;
        let raw = evaluate(effect.value(), state, binding)?;
        let value = match effect.target().value_type().coerce(raw.clone()) {
            Some(value) => value,
            None => return Err(TransitionError::OutOfBounds { target, value: raw }),
        };
        if let Some(previous) = assignments.get(&target) {
            if !previous.semantically_equals(&value) {
                return Err(TransitionError::ConflictingEffects {
                    first: previous.clone(),
                    second: value,
                    target,
                });
            }
            continue;
        }
        assignments.insert(target, value);
    }

    let mut next = state.clone();
    for (target, value) in assignments {
        next.set(target, value);
    }
    Ok(next)
}

fn number(value: Value) -> Result<f64, EvalError> {
    value
        .as_f64()
        .ok_or_else(|| EvalError::TypeMismatch(format!("{value} is not a number")))
}

fn compare(
    l: &Expr,
    r: &Expr,
    state: &State,
    binding: &Binding,
    test: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, EvalError> {
    let (l, r) = (evaluate(l, state, binding)?, evaluate(r, state, binding)?);
    let ordering = match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        _ => OrderedFloat(number(l)?).cmp(&OrderedFloat(number(r)?)),
    };
    Ok(Value::Bool(test(ordering)))
}

fn arithmetic(
    l: &Expr,
    r: &Expr,
    state: &State,
    binding: &Binding,
    int_op: fn(i64, i64) -> Option<i64>,
    real_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let (l, r) = (evaluate(l, state, binding)?, evaluate(r, state, binding)?);
    match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int).ok_or(EvalError::Overflow),
        _ => Ok(Value::real(real_op(number(l)?, number(r)?))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fluent::Fluent;
    use crate::types::{Object, Parameter, UserType, ValueType};

    struct World {
        at: Arc<Fluent>,
        charge: Arc<Fluent>,
        l1: Object,
        l2: Object,
        state: State,
    }

    fn world() -> World {
        let loc = UserType::new("Location");
        let at = Arc::new(Fluent::boolean("at", vec![Parameter::new("l", &loc)]).unwrap());
        let charge =
            Arc::new(Fluent::new("charge", ValueType::bounded_real(0.0, 100.0), vec![]).unwrap());
        let l1 = Object::new("l1", &loc);
        let l2 = Object::new("l2", &loc);
        let state: State = [
            (GroundFluent::new("at", vec![l1.clone()]), Value::Bool(true)),
            (GroundFluent::new("at", vec![l2.clone()]), Value::Bool(false)),
            (GroundFluent::new("charge", vec![]), Value::real(15.0)),
        ]
        .into_iter()
        .collect();
        World {
            at,
            charge,
            l1,
            l2,
            state,
        }
    }

    #[test]
    fn test_mixed_arithmetic_widens() {
        let w = world();
        let charge = Expr::fluent(&w.charge, Vec::<Expr>::new()).unwrap();
        let e = Expr::minus(charge, 10).unwrap();
        assert_eq!(
            evaluate(&e, &w.state, &Binding::new()).unwrap(),
            Value::real(5.0)
        );
    }

    #[test]
    fn test_int_overflow_reported() {
        let w = world();
        let e = Expr::plus(i64::MAX, 1).unwrap();
        assert_eq!(
            evaluate(&e, &w.state, &Binding::new()),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn test_division_by_zero() {
        let w = world();
        let e = Expr::div(1, 0).unwrap();
        assert_eq!(
            evaluate(&e, &w.state, &Binding::new()),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_unbound_parameter() {
        let w = world();
        let p = Parameter::new("x", w.l1.user_type());
        let e = Expr::fluent(&w.at, [p]).unwrap();
        assert!(matches!(
            evaluate(&e, &w.state, &Binding::new()),
            Err(EvalError::Unbound(_))
        ));
    }

    #[test]
    fn test_effects_read_pre_state() {
        let w = world();
        let at_l1 = Expr::fluent(&w.at, [&w.l1]).unwrap();
        let at_l2 = Expr::fluent(&w.at, [&w.l2]).unwrap();
        // swap: each effect reads the other fluent's old value
        let effects = vec![
            Effect::new(at_l1.clone(), at_l2.clone()).unwrap(),
            Effect::new(at_l2, at_l1).unwrap(),
        ];
        let next = apply_effects(&effects, &w.state, &Binding::new()).unwrap();
        assert_eq!(next.value_of("at", &["l1"]), Some(&Value::Bool(false)));
        assert_eq!(next.value_of("at", &["l2"]), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_false_guard_skips_effect() {
        let w = world();
        let at_l2 = Expr::fluent(&w.at, [&w.l2]).unwrap();
        let effects = vec![Effect::conditional(at_l2.clone(), at_l2, false).unwrap()];
        let next = apply_effects(&effects, &w.state, &Binding::new()).unwrap();
        assert_eq!(next, w.state);
    }

    #[test]
    fn test_bounds_violation() {
        let w = world();
        let charge = Expr::fluent(&w.charge, Vec::<Expr>::new()).unwrap();
        let effects = vec![Effect::new(charge.clone(), Expr::minus(charge, 20).unwrap()).unwrap()];
        let err = apply_effects(&effects, &w.state, &Binding::new()).unwrap_err();
        assert!(matches!(err, TransitionError::OutOfBounds { .. }));
    }

    #[test]
    fn test_dynamic_conflict_detected() {
        let w = world();
        let loc = w.l1.user_type().clone();
        let x = Parameter::new("x", &loc);
        let y = Parameter::new("y", &loc);
        let effects = vec![
            Effect::new(Expr::fluent(&w.at, [&x]).unwrap(), true).unwrap(),
            Effect::new(Expr::fluent(&w.at, [&y]).unwrap(), false).unwrap(),
        ];
        let mut binding = Binding::new();
        binding.insert(&x, w.l1.clone());
        binding.insert(&y, w.l1.clone());
        let err = apply_effects(&effects, &w.state, &binding).unwrap_err();
        assert!(matches!(err, TransitionError::ConflictingEffects { .. }));
    }
}
