use std::collections::HashSet;
use std::sync::Arc;

use super::*;
use crate::types::UserType;

fn location() -> UserType {
    UserType::new("Location")
}

fn robot_at() -> Arc<Fluent> {
    Arc::new(Fluent::boolean("robot_at", vec![Parameter::new("l", &location())]).unwrap())
}

fn charge() -> Arc<Fluent> {
    Arc::new(Fluent::new("charge", ValueType::real(), vec![]).unwrap())
}

#[test]
fn test_boolean_connectives_reject_numbers() {
    let err = Expr::and([Expr::Bool(true), Expr::Int(3)]).unwrap_err();
    assert!(matches!(err, PlanningError::TypeMismatch { .. }));
    assert!(Expr::not(Expr::Int(1)).is_err());
    assert!(Expr::implies(true, 0).is_err());
}

#[test]
fn test_comparisons_require_numbers() {
    let l1 = Object::new("l1", &location());
    assert!(Expr::ge(Expr::Object(l1.clone()), 3).is_err());
    assert!(Expr::lt(1, 2.5).is_ok());
    assert!(Expr::plus(true, 1).is_err());
}

#[test]
fn test_equality_requires_compatible_operands() {
    let vehicle = UserType::new("Vehicle");
    let truck = UserType::with_parent("Truck", &vehicle);
    let v = Object::new("v", &vehicle);
    let t = Object::new("t", &truck);
    let l = Object::new("l", &location());

    assert!(Expr::eq(&v, &t).is_ok());
    assert!(Expr::eq(1, 2.0).is_ok());
    assert!(Expr::eq(&v, &l).is_err());
    assert!(Expr::eq(true, 1).is_err());
}

#[test]
fn test_fluent_application_checks_arity_and_types() {
    let at = robot_at();
    let err = Expr::fluent(&at, Vec::<Expr>::new()).unwrap_err();
    assert!(matches!(err, PlanningError::ArityMismatch { expected: 1, found: 0, .. }));

    let stranger = Object::new("bob", &UserType::new("Robot"));
    let err = Expr::fluent(&at, [stranger]).unwrap_err();
    assert!(matches!(err, PlanningError::TypeMismatch { .. }));
}

#[test]
fn test_value_type_is_structural() {
    let c = Expr::fluent(&charge(), Vec::<Expr>::new()).unwrap();
    assert!(Expr::plus(1, 2).unwrap().value_type().is_int());
    assert!(Expr::minus(c.clone(), 10).unwrap().value_type().is_real());
    assert!(Expr::div(4, 2).unwrap().value_type().is_real());
    assert!(Expr::ge(c, 10).unwrap().value_type().is_bool());
}

#[test]
fn test_structural_equality_and_hash() {
    let at = robot_at();
    let l1 = Object::new("l1", &location());
    let a = Expr::not(Expr::fluent(&at, [&l1]).unwrap()).unwrap();
    let b = Expr::not(Expr::fluent(&at, [&l1]).unwrap()).unwrap();
    assert_eq!(a, b);

    let set: HashSet<Expr> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_substitute_grounds_parameters() {
    let at = robot_at();
    let p = Parameter::new("l", &location());
    let l1 = Object::new("l1", &location());
    let open = Expr::and([
        Expr::fluent(&at, [&p]).unwrap(),
        Expr::not(Expr::eq(&p, &l1).unwrap()).unwrap(),
    ])
    .unwrap();
    assert!(!open.is_ground());

    let binding = Binding::bind("test", std::slice::from_ref(&p), std::slice::from_ref(&l1)).unwrap();
    let ground = open.substitute(&binding);
    assert!(ground.is_ground());
    assert_eq!(ground.to_string(), "(robot_at(l1) and (not (l1 == l1)))");
}

#[test]
fn test_binding_checks_types() {
    let p = Parameter::new("l", &location());
    let bob = Object::new("bob", &UserType::new("Robot"));
    assert!(matches!(
        Binding::bind("move", &[p.clone()], &[bob]),
        Err(PlanningError::TypeMismatch { .. })
    ));
    assert!(matches!(
        Binding::bind("move", &[p], &[]),
        Err(PlanningError::ArityMismatch { .. })
    ));
}

#[test]
fn test_check_scope() {
    let at = robot_at();
    let p = Parameter::new("l", &location());
    let q = Parameter::new("m", &location());
    let e = Expr::fluent(&at, [&q]).unwrap();
    assert!(e.check_scope(&[p.clone(), q]).is_ok());
    assert!(matches!(
        e.check_scope(&[p]),
        Err(PlanningError::UndefinedName(_))
    ));
}

#[test]
fn test_nnf_pushes_negation_to_atoms() {
    let at = robot_at();
    let l1 = Object::new("l1", &location());
    let l2 = Object::new("l2", &location());
    let a = Expr::fluent(&at, [&l1]).unwrap();
    let b = Expr::fluent(&at, [&l2]).unwrap();

    let e = Expr::not(Expr::and([a.clone(), Expr::not(b.clone()).unwrap()]).unwrap()).unwrap();
    let expected = Expr::Or(vec![Expr::Not(Box::new(a.clone())), b.clone()]);
    assert_eq!(e.to_nnf(), expected);

    let imp = Expr::implies(a.clone(), b.clone()).unwrap();
    assert_eq!(
        imp.to_nnf(),
        Expr::Or(vec![Expr::Not(Box::new(a.clone())), b.clone()])
    );
    assert_eq!(
        Expr::not(imp).unwrap().to_nnf(),
        Expr::And(vec![a, Expr::Not(Box::new(b))])
    );
}

#[test]
fn test_nnf_keeps_negated_comparisons_as_atoms() {
    let c = Expr::fluent(&charge(), Vec::<Expr>::new()).unwrap();
    let ge = Expr::ge(c, 10).unwrap();
    let e = Expr::not(Expr::not(Expr::not(ge.clone()).unwrap()).unwrap()).unwrap();
    assert_eq!(e.to_nnf(), Expr::Not(Box::new(ge)));
    assert_eq!(Expr::not(true).unwrap().to_nnf(), Expr::Bool(false));
}

#[test]
fn test_fluent_applications_include_nested() {
    let at = robot_at();
    let l1 = Object::new("l1", &location());
    let e = Expr::or([
        Expr::fluent(&at, [&l1]).unwrap(),
        Expr::ge(Expr::fluent(&charge(), Vec::<Expr>::new()).unwrap(), 1).unwrap(),
    ])
    .unwrap();
    let names: Vec<&str> = e
        .fluent_applications()
        .iter()
        .map(|f| f.fluent().name())
        .collect();
    assert_eq!(names, vec!["robot_at", "charge"]);
}

#[test]
fn test_transform_leaves_untouched_subtrees_equal() {
    let at = robot_at();
    let l1 = Object::new("l1", &location());
    let keep = Expr::ge(Expr::fluent(&charge(), Vec::<Expr>::new()).unwrap(), 10).unwrap();
    let e = Expr::and([keep.clone(), Expr::fluent(&at, [&l1]).unwrap()]).unwrap();

    let rewritten = e.transform(&mut |node| match node {
        Expr::Fluent(f) if f.fluent().name() == "robot_at" => Some(Expr::Bool(true)),
        _ => None,
    });
    assert_eq!(rewritten, Expr::And(vec![keep, Expr::Bool(true)]));
}

#[test]
fn test_type_check_rejects_trees_built_from_variants() {
    let not_a_number = Expr::Not(Box::new(Expr::Int(3)));
    assert_eq!(not_a_number.value_type(), ValueType::Bool);
    assert!(matches!(
        not_a_number.type_check(),
        Err(PlanningError::TypeMismatch { .. })
    ));

    let nested = Expr::And(vec![
        Expr::Bool(true),
        Expr::Lt(Box::new(Expr::Bool(false)), Box::new(Expr::Int(1))),
    ]);
    assert!(matches!(
        nested.type_check(),
        Err(PlanningError::TypeMismatch { .. })
    ));

    let l1 = Object::new("l1", &location());
    let checked = Expr::and([
        Expr::not(Expr::fluent(&robot_at(), [&l1]).unwrap()).unwrap(),
        Expr::ge(Expr::fluent(&charge(), Vec::<Expr>::new()).unwrap(), 10).unwrap(),
    ])
    .unwrap();
    assert!(checked.type_check().is_ok());
}
