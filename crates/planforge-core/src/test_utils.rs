//! Test utilities for planforge-core

use std::sync::Arc;

use crate::{
    Action, ActionInstance, Expr, Fluent, Object, Parameter, Plan, Problem, UserType, ValueType,
};

/// The two-location robot with a battery.
pub struct RobotBattery {
    pub problem: Problem,
    pub robot_at: Arc<Fluent>,
    pub battery_charge: Arc<Fluent>,
    pub l1: Object,
    pub l2: Object,
}

impl RobotBattery {
    /// The one-step plan `[move(l1, l2)]`.
    pub fn plan(&self) -> Plan {
        Plan::new(vec![ActionInstance::new(
            "move",
            vec![self.l1.clone(), self.l2.clone()],
        )])
    }
}

/// Builds the robot-battery problem.
///
/// `robot_at(l1)` holds initially, the battery starts full at 100, moving
/// costs 10 and requires the destination to be free.
pub fn robot_battery() -> RobotBattery {
    let location = UserType::new("Location");
    let mut problem = Problem::new("robot");

    let robot_at = problem
        .add_fluent_with_default(
            Fluent::boolean("robot_at", vec![Parameter::new("position", &location)]).unwrap(),
            false,
        )
        .unwrap();
    let battery_charge = problem
        .add_fluent(Fluent::new("battery_charge", ValueType::bounded_real(0.0, 100.0), vec![]).unwrap())
        .unwrap();

    let mut move_action = Action::new(
        "move",
        vec![
            Parameter::new("l_from", &location),
            Parameter::new("l_to", &location),
        ],
    )
    .unwrap();
    let from = move_action.parameter("l_from").unwrap();
    let to = move_action.parameter("l_to").unwrap();
    let charge = Expr::fluent(&battery_charge, Vec::<Expr>::new()).unwrap();
    let at_from = Expr::fluent(&robot_at, [&from]).unwrap();
    let at_to = Expr::fluent(&robot_at, [&to]).unwrap();

    move_action
        .add_precondition(Expr::ge(charge.clone(), 10).unwrap())
        .unwrap();
    move_action
        .add_precondition(Expr::not(Expr::eq(&from, &to).unwrap()).unwrap())
        .unwrap();
    move_action.add_precondition(at_from.clone()).unwrap();
    move_action
        .add_precondition(Expr::not(at_to.clone()).unwrap())
        .unwrap();
    move_action.add_effect(at_from, false).unwrap();
    move_action.add_effect(at_to, true).unwrap();
    move_action.add_decrease_effect(charge, 10).unwrap();
    problem.add_action(move_action).unwrap();

    let l1 = Object::new("l1", &location);
    let l2 = Object::new("l2", &location);
    problem.add_objects([l1.clone(), l2.clone()]).unwrap();

    problem
        .set_initial_value(Expr::fluent(&robot_at, [&l1]).unwrap(), true)
        .unwrap();
    problem
        .set_initial_value(Expr::fluent(&battery_charge, Vec::<Expr>::new()).unwrap(), 100)
        .unwrap();
    problem
        .add_goal(Expr::fluent(&robot_at, [&l2]).unwrap())
        .unwrap();

    RobotBattery {
        problem,
        robot_at,
        battery_charge,
        l1,
        l2,
    }
}
