//! Immutable, type-checked expression trees.
//!
//! Expressions are built through checked constructors that reject ill-typed
//! trees immediately with [`PlanningError::TypeMismatch`]. Trees assembled
//! from the variants directly are re-checked by [`Expr::type_check`] when
//! they are added to an action or a problem. They are shared by
//! preconditions, effects, goals and initial values.

mod binding;
mod display;
mod nnf;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::error::{PlanningError, Result};
use crate::fluent::Fluent;
use crate::types::{Object, Parameter, Value, ValueType};

pub use binding::Binding;

/// An expression tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Bool(bool),
    Int(i64),
    Real(OrderedFloat<f64>),
    Object(Object),
    Param(Parameter),
    Fluent(FluentExp),

    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),

    Eq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),

    Plus(Box<Expr>, Box<Expr>),
    Minus(Box<Expr>, Box<Expr>),
    Times(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

/// A fluent applied to argument expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FluentExp {
    fluent: Arc<Fluent>,
    args: Vec<Expr>,
}

impl FluentExp {
    /// Applies `fluent` to `args`, checking arity and argument types.
    pub fn new<I, E>(fluent: &Arc<Fluent>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let args: Vec<Expr> = args.into_iter().map(Into::into).collect();
        check_arguments(fluent, &args)?;
        Ok(Self {
            fluent: Arc::clone(fluent),
            args,
        })
    }

    pub fn fluent(&self) -> &Arc<Fluent> {
        &self.fluent
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn value_type(&self) -> &ValueType {
        self.fluent.value_type()
    }
}

fn check_arguments(fluent: &Fluent, args: &[Expr]) -> Result<()> {
    if args.len() != fluent.arity() {
        return Err(PlanningError::ArityMismatch {
            name: fluent.name().to_string(),
            expected: fluent.arity(),
            found: args.len(),
        });
    }
    for (param, arg) in fluent.parameters().iter().zip(args) {
        let expected = ValueType::Object(param.user_type().clone());
        let found = arg.value_type();
        if !expected.accepts(&found) {
            return Err(PlanningError::type_mismatch(
                format!("argument {} of {}", param.name(), fluent.name()),
                expected.to_string(),
                found,
            ));
        }
    }
    Ok(())
}

impl Expr {
    // Checked constructors

    /// Applies a fluent to arguments.
    pub fn fluent<I, E>(fluent: &Arc<Fluent>, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        FluentExp::new(fluent, args).map(Expr::Fluent)
    }

    pub fn real(value: f64) -> Expr {
        Expr::Real(OrderedFloat(value))
    }

    pub fn and<I: IntoIterator<Item = Expr>>(operands: I) -> Result<Expr> {
        let operands = require_all_bool(operands, "and")?;
        Ok(Expr::And(operands))
    }

    pub fn or<I: IntoIterator<Item = Expr>>(operands: I) -> Result<Expr> {
        let operands = require_all_bool(operands, "or")?;
        Ok(Expr::Or(operands))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: impl Into<Expr>) -> Result<Expr> {
        let operand = operand.into();
        require_bool(&operand, "not")?;
        Ok(Expr::Not(Box::new(operand)))
    }

    pub fn implies(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        let (left, right) = (left.into(), right.into());
        require_bool(&left, "implies")?;
        require_bool(&right, "implies")?;
        Ok(Expr::Implies(Box::new(left), Box::new(right)))
    }

    pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        let (left, right) = (left.into(), right.into());
        require_compatible(&left, &right)?;
        Ok(Expr::Eq(Box::new(left), Box::new(right)))
    }

    pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "<", Expr::Lt)
    }

    pub fn le(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "<=", Expr::Le)
    }

    pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, ">", Expr::Gt)
    }

    pub fn ge(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, ">=", Expr::Ge)
    }

    pub fn plus(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "+", Expr::Plus)
    }

    pub fn minus(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "-", Expr::Minus)
    }

    pub fn times(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "*", Expr::Times)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Expr> {
        numeric_binary(left, right, "/", Expr::Div)
    }

    /// Derives the type of this expression structurally.
    pub fn value_type(&self) -> ValueType {
        match self {
            Expr::Bool(_) => ValueType::Bool,
            Expr::Int(_) => ValueType::int(),
            Expr::Real(_) => ValueType::real(),
            Expr::Object(o) => ValueType::Object(o.user_type().clone()),
            Expr::Param(p) => ValueType::Object(p.user_type().clone()),
            Expr::Fluent(f) => f.value_type().clone(),
            Expr::And(_)
            | Expr::Or(_)
            | Expr::Not(_)
            | Expr::Implies(..)
            | Expr::Eq(..)
            | Expr::Lt(..)
            | Expr::Le(..)
            | Expr::Gt(..)
            | Expr::Ge(..) => ValueType::Bool,
            Expr::Plus(l, r) | Expr::Minus(l, r) | Expr::Times(l, r) => {
                if l.value_type().is_int() && r.value_type().is_int() {
                    ValueType::int()
                } else {
                    ValueType::real()
                }
            }
            Expr::Div(..) => ValueType::real(),
        }
    }

    /// Direct sub-expressions, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Real(_)
            | Expr::Object(_)
            | Expr::Param(_) => Vec::new(),
            Expr::Fluent(f) => f.args.iter().collect(),
            Expr::And(xs) | Expr::Or(xs) => xs.iter().collect(),
            Expr::Not(x) => vec![x.as_ref()],
            Expr::Implies(l, r)
            | Expr::Eq(l, r)
            | Expr::Lt(l, r)
            | Expr::Le(l, r)
            | Expr::Gt(l, r)
            | Expr::Ge(l, r)
            | Expr::Plus(l, r)
            | Expr::Minus(l, r)
            | Expr::Times(l, r)
            | Expr::Div(l, r) => vec![l.as_ref(), r.as_ref()],
        }
    }

    /// Visits this expression and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Rebuilds the tree top-down.
    ///
    /// `rewrite` is offered every node before its children; returning
    /// `Some(replacement)` substitutes the whole subtree, `None` keeps the node
    /// and descends. Replacements must have the type of the node they replace.
    pub fn transform(&self, rewrite: &mut dyn FnMut(&Expr) -> Option<Expr>) -> Expr {
        if let Some(replacement) = rewrite(self) {
            debug_assert!(
                replacement.value_type().is_compatible_with(&self.value_type()),
                "rewrite changed the type of {self}"
            );
            return replacement;
        }
        fn bx(e: &Expr, rewrite: &mut dyn FnMut(&Expr) -> Option<Expr>) -> Box<Expr> {
            Box::new(e.transform(rewrite))
        }
        match self {
            Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Real(_)
            | Expr::Object(_)
            | Expr::Param(_) => self.clone(),
            Expr::Fluent(f) => Expr::Fluent(FluentExp {
                fluent: Arc::clone(&f.fluent),
                args: f.args.iter().map(|a| a.transform(rewrite)).collect(),
            }),
            Expr::And(xs) => Expr::And(xs.iter().map(|x| x.transform(rewrite)).collect()),
            Expr::Or(xs) => Expr::Or(xs.iter().map(|x| x.transform(rewrite)).collect()),
            Expr::Not(x) => Expr::Not(bx(x, rewrite)),
            Expr::Implies(l, r) => Expr::Implies(bx(l, rewrite), bx(r, rewrite)),
            Expr::Eq(l, r) => Expr::Eq(bx(l, rewrite), bx(r, rewrite)),
            Expr::Lt(l, r) => Expr::Lt(bx(l, rewrite), bx(r, rewrite)),
            Expr::Le(l, r) => Expr::Le(bx(l, rewrite), bx(r, rewrite)),
            Expr::Gt(l, r) => Expr::Gt(bx(l, rewrite), bx(r, rewrite)),
            Expr::Ge(l, r) => Expr::Ge(bx(l, rewrite), bx(r, rewrite)),
            Expr::Plus(l, r) => Expr::Plus(bx(l, rewrite), bx(r, rewrite)),
            Expr::Minus(l, r) => Expr::Minus(bx(l, rewrite), bx(r, rewrite)),
            Expr::Times(l, r) => Expr::Times(bx(l, rewrite), bx(r, rewrite)),
            Expr::Div(l, r) => Expr::Div(bx(l, rewrite), bx(r, rewrite)),
        }
    }

    /// Replaces parameter references bound in `binding` with objects.
    pub fn substitute(&self, binding: &Binding) -> Expr {
        self.transform(&mut |e| match e {
            Expr::Param(p) => binding.get(p.name()).cloned().map(Expr::Object),
            _ => None,
        })
    }

    /// Checks that every parameter reference belongs to `scope`.
    pub fn check_scope(&self, scope: &[Parameter]) -> Result<()> {
        let mut result = Ok(());
        self.walk(&mut |e| {
            if let Expr::Param(p) = e {
                if result.is_ok() && !scope.contains(p) {
                    result = Err(PlanningError::UndefinedName(format!("parameter {}", p.name())));
                }
            }
        });
        result
    }

    /// Returns true if the expression contains no parameter references.
    pub fn is_ground(&self) -> bool {
        let mut ground = true;
        self.walk(&mut |e| ground &= !matches!(e, Expr::Param(_)));
        ground
    }

    /// All fluent applications in pre-order, including nested ones.
    pub fn fluent_applications(&self) -> Vec<&FluentExp> {
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Fluent(f) = e {
                found.push(f);
            }
        });
        found
    }

    /// Returns the constant value if this node is a literal.
    pub fn as_constant(&self) -> Option<Value> {
        match self {
            Expr::Bool(b) => Some(Value::Bool(*b)),
            Expr::Int(i) => Some(Value::Int(*i)),
            Expr::Real(r) => Some(Value::Real(*r)),
            Expr::Object(o) => Some(Value::Object(o.clone())),
            _ => None,
        }
    }

    pub fn as_fluent(&self) -> Option<&FluentExp> {
        match self {
            Expr::Fluent(f) => Some(f),
            _ => None,
        }
    }

    /// Checks every node of the tree against the rules the constructors
    /// enforce.
    ///
    /// Trees assembled directly from the variants skip those constructors, so
    /// the problem model runs this on every expression it accepts.
    pub fn type_check(&self) -> Result<()> {
        for child in self.children() {
            child.type_check()?;
        }
        match self {
            Expr::Bool(_) | Expr::Int(_) | Expr::Real(_) | Expr::Object(_) | Expr::Param(_) => {
                Ok(())
            }
            Expr::Fluent(f) => check_arguments(&f.fluent, &f.args),
            Expr::And(xs) => xs.iter().try_for_each(|x| require_bool(x, "and")),
            Expr::Or(xs) => xs.iter().try_for_each(|x| require_bool(x, "or")),
            Expr::Not(x) => require_bool(x, "not"),
            Expr::Implies(l, r) => {
                require_bool(l, "implies")?;
                require_bool(r, "implies")
            }
            Expr::Eq(l, r) => require_compatible(l, r),
            Expr::Lt(l, r) => require_numeric([&**l, &**r], "<"),
            Expr::Le(l, r) => require_numeric([&**l, &**r], "<="),
            Expr::Gt(l, r) => require_numeric([&**l, &**r], ">"),
            Expr::Ge(l, r) => require_numeric([&**l, &**r], ">="),
            Expr::Plus(l, r) => require_numeric([&**l, &**r], "+"),
            Expr::Minus(l, r) => require_numeric([&**l, &**r], "-"),
            Expr::Times(l, r) => require_numeric([&**l, &**r], "*"),
            Expr::Div(l, r) => require_numeric([&**l, &**r], "/"),
        }
    }

    /// Splits a top-level conjunction into its operands.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(xs) => xs.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Expr::Bool(b),
            Value::Int(i) => Expr::Int(i),
            Value::Real(r) => Expr::Real(r),
            Value::Object(o) => Expr::Object(o),
        }
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Bool(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Int(i64::from(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Int(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::real(value)
    }
}

impl From<Object> for Expr {
    fn from(value: Object) -> Self {
        Expr::Object(value)
    }
}

impl From<&Object> for Expr {
    fn from(value: &Object) -> Self {
        Expr::Object(value.clone())
    }
}

impl From<Parameter> for Expr {
    fn from(value: Parameter) -> Self {
        Expr::Param(value)
    }
}

impl From<&Parameter> for Expr {
    fn from(value: &Parameter) -> Self {
        Expr::Param(value.clone())
    }
}

impl From<FluentExp> for Expr {
    fn from(value: FluentExp) -> Self {
        Expr::Fluent(value)
    }
}

impl From<&Expr> for Expr {
    fn from(value: &Expr) -> Self {
        value.clone()
    }
}

fn require_bool(expr: &Expr, context: &str) -> Result<()> {
    let ty = expr.value_type();
    if ty.is_bool() {
        Ok(())
    } else {
        Err(PlanningError::type_mismatch(context, "bool", ty))
    }
}

fn require_all_bool<I: IntoIterator<Item = Expr>>(operands: I, context: &str) -> Result<Vec<Expr>> {
    let operands: Vec<Expr> = operands.into_iter().collect();
    for operand in &operands {
        require_bool(operand, context)?;
    }
    Ok(operands)
}

fn numeric_binary(
    left: impl Into<Expr>,
    right: impl Into<Expr>,
    context: &str,
    build: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Result<Expr> {
    let (left, right) = (left.into(), right.into());
    require_numeric([&left, &right], context)?;
    Ok(build(Box::new(left), Box::new(right)))
}

fn require_numeric(operands: [&Expr; 2], context: &str) -> Result<()> {
    for operand in operands {
        let ty = operand.value_type();
        if !ty.is_numeric() {
            return Err(PlanningError::type_mismatch(context, "number", ty));
        }
    }
    Ok(())
}

fn require_compatible(left: &Expr, right: &Expr) -> Result<()> {
    let (lt, rt) = (left.value_type(), right.value_type());
    if !lt.is_compatible_with(&rt) {
        return Err(PlanningError::type_mismatch("==", lt.to_string(), rt));
    }
    Ok(())
}
