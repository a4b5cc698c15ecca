//! Types, objects, parameters and runtime values.

use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A user-declared type of objects.
///
/// Types form a forest: a type may declare a parent, and the parent must
/// already exist when the child is built, so the hierarchy cannot contain
/// cycles.
///
/// # Example
///
/// ```
/// use planforge_core::UserType;
///
/// let vehicle = UserType::new("Vehicle");
/// let truck = UserType::with_parent("Truck", &vehicle);
///
/// assert!(truck.is_subtype_of(&vehicle));
/// assert!(!vehicle.is_subtype_of(&truck));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserType {
    name: Arc<str>,
    parent: Option<Box<UserType>>,
}

impl UserType {
    /// Creates a root type.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a type whose parent is `parent`.
    pub fn with_parent(name: impl Into<Arc<str>>, parent: &UserType) -> Self {
        Self {
            name: name.into(),
            parent: Some(Box::new(parent.clone())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&UserType> {
        self.parent.as_deref()
    }

    /// Returns true if `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: &UserType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == other {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// Returns this type followed by all of its ancestors, closest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &UserType> {
        std::iter::successors(Some(self), |ty| ty.parent())
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named constant of exactly one user type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Object {
    name: Arc<str>,
    ty: UserType,
}

impl Object {
    pub fn new(name: impl Into<Arc<str>>, ty: &UserType) -> Self {
        Self {
            name: name.into(),
            ty: ty.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_type(&self) -> &UserType {
        &self.ty
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A typed formal parameter of a fluent or an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parameter {
    name: Arc<str>,
    ty: UserType,
}

impl Parameter {
    pub fn new(name: impl Into<Arc<str>>, ty: &UserType) -> Self {
        Self {
            name: name.into(),
            ty: ty.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_type(&self) -> &UserType {
        &self.ty
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.ty)
    }
}

/// The type of a fluent value or of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    /// Integer with optional inclusive bounds.
    Int {
        lower: Option<i64>,
        upper: Option<i64>,
    },
    /// Real number with optional inclusive bounds.
    Real {
        lower: Option<OrderedFloat<f64>>,
        upper: Option<OrderedFloat<f64>>,
    },
    Object(UserType),
}

impl ValueType {
    /// Unbounded integer type.
    pub fn int() -> Self {
        ValueType::Int {
            lower: None,
            upper: None,
        }
    }

    pub fn bounded_int(lower: i64, upper: i64) -> Self {
        ValueType::Int {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Unbounded real type.
    pub fn real() -> Self {
        ValueType::Real {
            lower: None,
            upper: None,
        }
    }

    pub fn bounded_real(lower: f64, upper: f64) -> Self {
        ValueType::Real {
            lower: Some(OrderedFloat(lower)),
            upper: Some(OrderedFloat(upper)),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, ValueType::Bool)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int { .. } | ValueType::Real { .. })
    }

    pub fn is_int(&self) -> bool {
        matches!(self, ValueType::Int { .. })
    }

    pub fn is_real(&self) -> bool {
        matches!(self, ValueType::Real { .. })
    }

    pub fn as_user_type(&self) -> Option<&UserType> {
        match self {
            ValueType::Object(ty) => Some(ty),
            _ => None,
        }
    }

    /// Returns true if values of the two types may be compared for equality.
    pub fn is_compatible_with(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Bool, ValueType::Bool) => true,
            (ValueType::Object(a), ValueType::Object(b)) => {
                a.is_subtype_of(b) || b.is_subtype_of(a)
            }
            _ => self.is_numeric() && other.is_numeric(),
        }
    }

    /// Returns true if a value of type `other` may be assigned to a slot of
    /// this type. Bounds are checked at runtime, not here.
    pub fn accepts(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Bool, ValueType::Bool) => true,
            (ValueType::Int { .. }, ValueType::Int { .. }) => true,
            (ValueType::Real { .. }, ValueType::Int { .. } | ValueType::Real { .. }) => true,
            (ValueType::Object(target), ValueType::Object(source)) => source.is_subtype_of(target),
            _ => false,
        }
    }

    /// Converts `value` into the canonical representation for this type.
    ///
    /// Integers assigned to real slots become reals. Returns `None` when the
    /// value does not belong to the type (including bound violations).
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (ValueType::Bool, v @ Value::Bool(_)) => Some(v),
            (ValueType::Int { lower, upper }, Value::Int(i)) => {
                let ok = lower.map_or(true, |l| i >= l) && upper.map_or(true, |u| i <= u);
                ok.then_some(Value::Int(i))
            }
            (ValueType::Real { lower, upper }, v @ (Value::Int(_) | Value::Real(_))) => {
                let r = OrderedFloat(v.as_f64()?);
                let ok = lower.map_or(true, |l| r >= l) && upper.map_or(true, |u| r <= u);
                ok.then_some(Value::Real(r))
            }
            (ValueType::Object(ty), Value::Object(o)) if o.user_type().is_subtype_of(ty) => {
                Some(Value::Object(o))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bounds<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            lower: &Option<T>,
            upper: &Option<T>,
        ) -> fmt::Result {
            match (lower, upper) {
                (None, None) => write!(f, "{name}"),
                (l, u) => {
                    let l = l.as_ref().map_or("-inf".to_string(), |v| v.to_string());
                    let u = u.as_ref().map_or("inf".to_string(), |v| v.to_string());
                    write!(f, "{name}[{l}, {u}]")
                }
            }
        }

        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int { lower, upper } => bounds(f, "int", lower, upper),
            ValueType::Real { lower, upper } => bounds(f, "real", lower, upper),
            ValueType::Object(ty) => write!(f, "{ty}"),
        }
    }
}

/// A runtime value held by a ground fluent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(OrderedFloat<f64>),
    Object(Object),
}

impl Value {
    pub fn real(value: f64) -> Self {
        Value::Real(OrderedFloat(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(r.0),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_))
    }

    /// Equality with numeric widening, so `Int(90) == Real(90.0)`.
    pub fn semantically_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{}", r.0),
            Value::Object(o) => write!(f, "{o}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::real(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}
