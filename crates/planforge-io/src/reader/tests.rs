//! Tests for the PDDL reader.

use planforge_core::{ActionInstance, Feature, Plan, PlanValidator, PlanningError, Problem, Value};

use super::*;

const ROBOT_DOMAIN: &str = r#"
; two locations, one battery
(define (domain Robot)
  (:requirements :strips :typing :negative-preconditions :equality :numeric-fluents)
  (:types location)
  (:predicates (robot_at ?position - location))
  (:functions (battery_charge) - number)
  (:action move
    :parameters (?l_from - location ?l_to - location)
    :precondition (and
      (>= (battery_charge) 10)
      (not (= ?l_from ?l_to))
      (robot_at ?l_from)
      (not (robot_at ?l_to)))
    :effect (and
      (not (robot_at ?l_from))
      (robot_at ?l_to)
      (decrease (battery_charge) 10))))
"#;

const ROBOT_PROBLEM: &str = r#"
(define (problem robot-1)
  (:domain robot)
  (:objects l1 l2 - location)
  (:init (robot_at l1) (= (battery_charge) 100))
  (:goal (robot_at l2)))
"#;

fn read(domain: &str, problem: &str) -> Result<Problem> {
    PddlReader::new().parse_problem_str(domain, problem)
}

fn step(problem: &Problem, action: &str, args: &[&str]) -> ActionInstance {
    let args = args
        .iter()
        .map(|name| problem.object(name).unwrap().clone())
        .collect();
    ActionInstance::new(action, args)
}

#[test]
fn test_robot_domain() {
    let problem = read(ROBOT_DOMAIN, ROBOT_PROBLEM).unwrap();
    assert_eq!(problem.name(), "robot-1");
    assert_eq!(problem.objects().len(), 2);

    let action = problem.action("move").unwrap();
    let preconditions: Vec<String> = action.preconditions().iter().map(|p| p.to_string()).collect();
    assert_eq!(
        preconditions,
        vec![
            "(battery_charge >= 10)",
            "(not (l_from == l_to))",
            "robot_at(l_from)",
            "(not robot_at(l_to))",
        ]
    );
    assert_eq!(action.effects().len(), 3);

    let kind = problem.kind();
    assert!(kind.has(Feature::NegativeConditions));
    assert!(kind.has(Feature::NumericFluents));
}

#[test]
fn test_read_problem_validates_plan() {
    let problem = read(ROBOT_DOMAIN, ROBOT_PROBLEM).unwrap();
    let plan = Plan::new(vec![step(&problem, "move", &["l1", "l2"])]);

    let result = PlanValidator::new().validate(&problem, &plan).unwrap();
    assert!(result.is_valid());
    let last = result.final_state().unwrap();
    assert_eq!(last.value_of("battery_charge", &[]), Some(&Value::real(90.0)));
}

#[test]
fn test_closed_world_init() {
    let problem = read(ROBOT_DOMAIN, ROBOT_PROBLEM).unwrap();
    let state = problem.initial_state().unwrap();
    assert_eq!(state.value_of("robot_at", &["l1"]), Some(&Value::Bool(true)));
    assert_eq!(state.value_of("robot_at", &["l2"]), Some(&Value::Bool(false)));
}

#[test]
fn test_uninitialised_function_is_incomplete() {
    let problem = read(
        ROBOT_DOMAIN,
        "(define (problem p) (:domain robot) (:objects l1 - location) (:goal (robot_at l1)))",
    )
    .unwrap();
    assert!(matches!(
        problem.initial_state(),
        Err(PlanningError::IncompleteInitialState { .. })
    ));
}

#[test]
fn test_type_hierarchy_declared_out_of_order() {
    let domain = r#"
        (define (domain logistics)
          (:requirements :strips :typing)
          (:types truck - vehicle vehicle place - object)
          (:constants garage)
          (:predicates (at ?v - vehicle ?p - place) (parked ?x)))
    "#;
    let problem = read(
        domain,
        "(define (problem p) (:domain logistics) (:objects t1 - truck home - place) (:goal (at t1 home)))",
    )
    .unwrap();

    let truck = problem.user_type("truck").unwrap();
    let vehicle = problem.user_type("vehicle").unwrap();
    assert!(truck.is_subtype_of(vehicle));
    assert!(vehicle.parent().is_none());
    assert_eq!(problem.object("garage").unwrap().user_type().name(), "object");
    assert!(problem.kind().has(Feature::HierarchicalTyping));
}

#[test]
fn test_nested_when_guards_are_conjoined() {
    let domain = r#"
        (define (domain lamps)
          (:requirements :strips :conditional-effects :negative-preconditions)
          (:predicates (power) (on) (broken))
          (:action press
            :effect (when (power) (when (not (broken)) (on)))))
    "#;
    let problem = read(domain, "(define (problem p) (:domain lamps) (:goal (on)))").unwrap();
    let effect = &problem.action("press").unwrap().effects()[0];
    assert_eq!(
        effect.condition().unwrap().to_string(),
        "(power and (not broken))"
    );
    assert_eq!(effect.to_string(), "if (power and (not broken)) then on := true");
}

#[test]
fn test_unknown_predicate_reports_line() {
    let domain = "(define (domain d)\n  (:predicates (p))\n  (:action a\n    :effect (q)))";
    let err = read(domain, "(define (problem p) (:domain d) (:goal (p)))").unwrap_err();
    assert!(matches!(err, IoError::Parse { line: 4, .. }), "{err}");
}

#[test]
fn test_unsupported_requirement() {
    let domain = "(define (domain d) (:requirements :durative-actions))";
    let err = read(domain, "(define (problem p) (:domain d))").unwrap_err();
    assert!(matches!(err, IoError::Parse { .. }));
    assert!(err.to_string().contains(":durative-actions"));
}

#[test]
fn test_domain_mismatch() {
    let err = read(ROBOT_DOMAIN, "(define (problem p) (:domain other))").unwrap_err();
    assert!(err.to_string().contains("other"));
}

#[test]
fn test_ill_typed_expression() {
    let domain = r#"
        (define (domain d)
          (:predicates (p))
          (:functions (f))
          (:action a :precondition (and (p) (f)) :effect (p)))
    "#;
    let err = read(domain, "(define (problem p) (:domain d))").unwrap_err();
    assert!(matches!(
        err,
        IoError::Problem(PlanningError::TypeMismatch { .. })
    ));
}

#[test]
fn test_unbound_variable_and_quantifiers() {
    let unbound = r#"
        (define (domain d)
          (:types t)
          (:predicates (p ?x - t))
          (:action a :parameters (?x - t) :effect (p ?y)))
    "#;
    let err = read(unbound, "(define (problem p) (:domain d))").unwrap_err();
    assert!(err.to_string().contains("?y"));

    let quantified = r#"
        (define (domain d)
          (:types t)
          (:predicates (p ?x - t))
          (:action a :precondition (forall (?x - t) (p ?x)) :effect (and)))
    "#;
    let err = read(quantified, "(define (problem p) (:domain d))").unwrap_err();
    assert!(matches!(err, IoError::Parse { .. }));
}

#[test]
fn test_empty_section_is_a_parse_error() {
    let err = read("(define (domain d) ())", "(define (problem p) (:domain d))").unwrap_err();
    assert!(matches!(err, IoError::Parse { line: 1, .. }), "{err}");

    let domain = "(define (domain d) (:predicates (p)))";
    let err = read(domain, "(define (problem p)\n  (:domain d)\n  ())").unwrap_err();
    assert!(matches!(err, IoError::Parse { line: 3, .. }), "{err}");
}

#[test]
fn test_add_wins_over_delete_of_same_atom() {
    let domain = r#"
        (define (domain d)
          (:types t)
          (:predicates (p ?x - t) (q))
          (:action a
            :parameters (?x - t)
            :effect (and (not (p ?x)) (p ?x) (not (q)))))
    "#;
    let problem = read(domain, "(define (problem p) (:domain d) (:objects o - t))").unwrap();
    let action = problem.action("a").unwrap();
    let effects: Vec<String> = action.effects().iter().map(|e| e.to_string()).collect();
    assert_eq!(effects, ["p(x) := true", "q := false"]);
}

#[test]
fn test_missing_files() {
    let err = PddlReader::new()
        .parse_problem("no/such/domain.pddl", "no/such/problem.pddl")
        .unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}
