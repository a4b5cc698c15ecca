//! Tests for the reference engines.

use planforge_config::SearchConfig;
use planforge_core::{Expr, Fluent, Plan, PlanningError, ValueType};
use planforge_test::{delivery, robot_battery};

use super::*;
use crate::engine::{Engine, Operation, SolveOutcome};
use crate::error::EngineError;

fn planner() -> BreadthFirstPlanner {
    BreadthFirstPlanner::new(&SearchConfig::default())
}

#[test]
fn test_robot_plan_found() {
    let rb = robot_battery();
    let outcome = planner().solve(&rb.problem).unwrap();
    assert_eq!(outcome, SolveOutcome::Solved(rb.plan()));
}

#[test]
fn test_delivery_plan_is_shortest() {
    let d = delivery();
    let outcome = planner().solve(&d.problem).unwrap();
    assert_eq!(outcome.plan(), Some(&d.plan()));
}

#[test]
fn test_goal_already_reached() {
    let mut rb = robot_battery();
    rb.problem.clear_goals();
    let outcome = planner().solve(&rb.problem).unwrap();
    assert_eq!(outcome, SolveOutcome::Solved(Plan::empty()));
}

#[test]
fn test_drained_battery_is_unsolvable() {
    let mut rb = robot_battery();
    let charge = Expr::fluent(&rb.battery_charge, Vec::<Expr>::new()).unwrap();
    rb.problem.set_initial_value(charge, 5).unwrap();
    assert_eq!(planner().solve(&rb.problem).unwrap(), SolveOutcome::Unsolvable);
}

#[test]
fn test_node_limit_times_out() {
    let d = delivery();
    let mut engine = planner().with_node_limit(2);
    assert_eq!(engine.solve(&d.problem).unwrap(), SolveOutcome::Timeout);
}

#[test]
fn test_incomplete_initial_state_is_error() {
    let mut rb = robot_battery();
    rb.problem
        .add_fluent(Fluent::new("spare", ValueType::int(), vec![]).unwrap())
        .unwrap();
    let err = planner().solve(&rb.problem).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Problem(PlanningError::IncompleteInitialState { .. })
    ));
}

#[test]
fn test_validator_accepts_and_rejects() {
    let rb = robot_battery();
    let mut validator = SequentialPlanValidator::new();
    assert!(validator.validate(&rb.problem, &rb.plan()).unwrap());
    assert!(!validator.validate(&rb.problem, &Plan::empty()).unwrap());
}

#[test]
fn test_undeclared_operations_fail() {
    let rb = robot_battery();
    let err = SequentialPlanValidator::new().solve(&rb.problem).unwrap_err();
    assert_eq!(
        err,
        EngineError::UnsupportedOperation {
            engine: SequentialPlanValidator::NAME.to_string(),
            operation: Operation::Solve,
        }
    );
    assert!(planner().validate(&rb.problem, &rb.plan()).is_err());
}
