use super::*;
use crate::kind::Feature;
use crate::test_utils::robot_battery;
use crate::types::ValueType;

#[test]
fn test_robot_battery_kind() {
    let rb = robot_battery();
    let kind = rb.problem.kind();

    assert!(kind.has(Feature::ActionBased));
    assert!(kind.has(Feature::FlatTyping));
    assert!(kind.has_negative_conditions());
    assert!(kind.has_equalities());
    assert!(kind.has_numeric_fluents());
    assert!(kind.has(Feature::ContinuousNumbers));
    assert!(!kind.has_disjunctive_conditions());
    assert!(!kind.has_conditional_effects());
}

#[test]
fn test_negated_equality_is_not_a_negative_condition() {
    let mut rb = robot_battery();
    let original = rb.problem.remove_action("move").unwrap();

    let from = original.parameter("l_from").unwrap();
    let to = original.parameter("l_to").unwrap();
    let mut plain = Action::new("move", original.parameters().to_vec()).unwrap();
    plain
        .add_precondition(Expr::not(Expr::eq(&from, &to).unwrap()).unwrap())
        .unwrap();
    for effect in original.effects() {
        plain.push_effect(effect.clone()).unwrap();
    }
    rb.problem.add_action(plain).unwrap();

    assert!(!rb.problem.kind().has_negative_conditions());
    assert!(rb.problem.kind().has_equalities());
}

#[test]
fn test_kind_is_invalidated_on_mutation() {
    let mut rb = robot_battery();
    assert!(rb.problem.kind().has_negative_conditions());

    rb.problem.remove_action("move").unwrap();
    assert!(!rb.problem.kind().has_negative_conditions());
}

#[test]
fn test_kind_is_deterministic_across_clones() {
    let rb = robot_battery();
    let copy = rb.problem.clone();
    assert_eq!(copy, rb.problem);
    assert_eq!(copy.kind(), rb.problem.kind());
}

#[test]
fn test_equality_ignores_cache() {
    let a = robot_battery().problem;
    let b = robot_battery().problem;
    let _ = a.kind();
    assert_eq!(a, b);
}

#[test]
fn test_hierarchical_typing() {
    let vehicle = UserType::new("Vehicle");
    let truck = UserType::with_parent("Truck", &vehicle);
    let mut problem = Problem::new("fleet");
    problem.add_object(Object::new("t1", &truck)).unwrap();
    problem.add_object(Object::new("v1", &vehicle)).unwrap();

    assert_eq!(problem.types().len(), 2);
    assert!(problem.kind().has(Feature::HierarchicalTyping));
    assert!(!problem.kind().has(Feature::FlatTyping));
    assert_eq!(problem.objects_of(&vehicle).len(), 2);
    assert_eq!(problem.objects_of(&truck).len(), 1);
}

#[test]
fn test_conflicting_type_names_rejected() {
    let mut problem = Problem::new("p");
    problem.add_type(&UserType::new("A")).unwrap();
    let other = UserType::with_parent("A", &UserType::new("Root"));
    assert!(matches!(
        problem.add_type(&other),
        Err(PlanningError::DuplicateName(_))
    ));
}

#[test]
fn test_duplicate_object_rejected() {
    let ty = UserType::new("T");
    let mut problem = Problem::new("p");
    problem.add_object(Object::new("o", &ty)).unwrap();
    assert!(matches!(
        problem.add_object(Object::new("o", &ty)),
        Err(PlanningError::DuplicateName(_))
    ));
}

#[test]
fn test_incomplete_initial_state_lists_missing() {
    let location = UserType::new("Location");
    let mut problem = Problem::new("p");
    let at = problem
        .add_fluent(Fluent::boolean("at", vec![Parameter::new("l", &location)]).unwrap())
        .unwrap();
    let l1 = Object::new("l1", &location);
    let l2 = Object::new("l2", &location);
    problem.add_objects([l1.clone(), l2]).unwrap();
    problem
        .set_initial_value(Expr::fluent(&at, [&l1]).unwrap(), true)
        .unwrap();

    match problem.initial_state() {
        Err(PlanningError::IncompleteInitialState { missing }) => {
            assert_eq!(missing, vec!["at(l2)".to_string()]);
        }
        other => panic!("expected IncompleteInitialState, got {other:?}"),
    }
}

#[test]
fn test_defaults_complete_initial_state() {
    let rb = robot_battery();
    let state = rb.problem.initial_state().unwrap();
    assert_eq!(state.len(), 3);
    assert_eq!(state.value_of("robot_at", &["l2"]), Some(&Value::Bool(false)));
    assert_eq!(state.value_of("battery_charge", &[]), Some(&Value::real(100.0)));
}

#[test]
fn test_initial_value_type_checked_at_set_time() {
    let mut rb = robot_battery();
    let charge = Expr::fluent(&rb.battery_charge, Vec::<Expr>::new()).unwrap();
    assert!(matches!(
        rb.problem.set_initial_value(charge.clone(), true),
        Err(PlanningError::TypeMismatch { .. })
    ));
    assert!(rb.problem.set_initial_value(charge, 250).is_err());
}

#[test]
fn test_remove_fluent_in_use() {
    let mut rb = robot_battery();
    assert!(matches!(
        rb.problem.remove_fluent("battery_charge"),
        Err(PlanningError::FluentInUse { .. })
    ));

    rb.problem.remove_action("move").unwrap();
    assert!(matches!(
        rb.problem.remove_fluent("robot_at"),
        Err(PlanningError::FluentInUse { .. })
    ));

    let removed = rb.problem.remove_fluent("battery_charge").unwrap();
    assert_eq!(removed.name(), "battery_charge");
    assert!(rb.problem.fluent("battery_charge").is_none());
    assert!(!rb.problem.kind().has_numeric_fluents());
}

#[test]
fn test_action_with_undeclared_fluent_rejected() {
    let location = UserType::new("Location");
    let stray = Arc::new(Fluent::boolean("stray", vec![]).unwrap());
    let mut action = Action::new("a", vec![Parameter::new("l", &location)]).unwrap();
    action
        .add_precondition(Expr::fluent(&stray, Vec::<Expr>::new()).unwrap())
        .unwrap();

    let mut problem = Problem::new("p");
    assert!(matches!(
        problem.add_action(action),
        Err(PlanningError::UndefinedName(_))
    ));
}

#[test]
fn test_goal_must_be_ground_boolean() {
    let mut rb = robot_battery();
    let charge = Expr::fluent(&rb.battery_charge, Vec::<Expr>::new()).unwrap();
    assert!(rb.problem.add_goal(charge).is_err());

    let p = Parameter::new("x", rb.l1.user_type());
    let open = Expr::fluent(&rb.robot_at, [p]).unwrap();
    assert!(matches!(
        rb.problem.add_goal(open),
        Err(PlanningError::InvalidValue(_))
    ));
}

#[test]
fn test_ground_applications() {
    let rb = robot_battery();
    let grounds = rb.problem.ground_applications(&rb.robot_at);
    let names: Vec<String> = grounds.iter().map(|g| g.to_string()).collect();
    assert_eq!(names, vec!["robot_at(l1)", "robot_at(l2)"]);

    let tuples = rb
        .problem
        .argument_tuples(rb.problem.action("move").unwrap().parameters());
    assert_eq!(tuples.len(), 4);
}

#[test]
fn test_default_must_fit_type() {
    let mut problem = Problem::new("p");
    let result = problem.add_fluent_with_default(
        Fluent::new("level", ValueType::bounded_int(0, 3), vec![]).unwrap(),
        7i64,
    );
    assert!(matches!(result, Err(PlanningError::InvalidValue(_))));
    assert!(problem.fluents().is_empty());
}

#[test]
fn test_model_rejects_ill_typed_trees() {
    let mut rb = robot_battery();
    let ill_typed = Expr::Not(Box::new(Expr::Int(3)));

    let mut noop = Action::new("noop", vec![]).unwrap();
    assert!(matches!(
        noop.add_precondition(ill_typed.clone()),
        Err(PlanningError::TypeMismatch { .. })
    ));
    assert!(noop.preconditions().is_empty());

    let at_l1 = Expr::fluent(&rb.robot_at, [&rb.l1]).unwrap();
    assert!(matches!(
        noop.add_effect(at_l1.clone(), ill_typed.clone()),
        Err(PlanningError::TypeMismatch { .. })
    ));
    assert!(matches!(
        noop.add_conditional_effect(ill_typed.clone(), at_l1, true),
        Err(PlanningError::TypeMismatch { .. })
    ));

    assert!(matches!(
        rb.problem.add_goal(ill_typed),
        Err(PlanningError::TypeMismatch { .. })
    ));
    assert_eq!(rb.problem.goals().len(), 1);
}
