//! The two-location robot-battery problem.
//!
//! A robot at `l1` must reach `l2`. Moving needs 10 units of charge out of a
//! battery that starts at 100, and the destination must be free:
//!
//! ```text
//! move(l_from, l_to)
//!   pre:  battery_charge >= 10, not (l_from == l_to),
//!         robot_at(l_from), not robot_at(l_to)
//!   eff:  robot_at(l_from) := false, robot_at(l_to) := true,
//!         battery_charge -= 10
//! ```

use std::sync::Arc;

use planforge_core::{
    Action, ActionInstance, Expr, Fluent, Object, Parameter, Plan, Problem, UserType, ValueType,
};

/// The robot-battery problem and handles to its parts.
#[derive(Clone, Debug)]
pub struct RobotBattery {
    pub problem: Problem,
    pub location: UserType,
    pub robot_at: Arc<Fluent>,
    pub battery_charge: Arc<Fluent>,
    pub l1: Object,
    pub l2: Object,
}

impl RobotBattery {
    /// `[move(l1, l2)]`, which reaches the goal with 90 charge left.
    pub fn plan(&self) -> Plan {
        Plan::new(vec![self.step(&self.l1, &self.l2)])
    }

    /// A single `move` step.
    pub fn step(&self, from: &Object, to: &Object) -> ActionInstance {
        ActionInstance::new("move", vec![from.clone(), to.clone()])
    }
}

/// Builds the robot-battery problem.
pub fn robot_battery() -> RobotBattery {
    let location = UserType::new("Location");
    let mut problem = Problem::new("robot");

    let robot_at = problem
        .add_fluent_with_default(
            Fluent::boolean("robot_at", vec![Parameter::new("position", &location)])
                .expect("robot_at signature"),
            false,
        )
        .expect("robot_at fluent");
    let battery_charge = problem
        .add_fluent(
            Fluent::new("battery_charge", ValueType::bounded_real(0.0, 100.0), vec![])
                .expect("battery_charge signature"),
        )
        .expect("battery_charge fluent");

    let mut move_action = Action::new(
        "move",
        vec![
            Parameter::new("l_from", &location),
            Parameter::new("l_to", &location),
        ],
    )
    .expect("move signature");
    build_move(&mut move_action, &robot_at, &battery_charge).expect("move body");
    problem.add_action(move_action).expect("move action");

    let l1 = Object::new("l1", &location);
    let l2 = Object::new("l2", &location);
    problem
        .add_objects([l1.clone(), l2.clone()])
        .expect("locations");

    let charge = Expr::fluent(&battery_charge, Vec::<Expr>::new()).expect("charge");
    problem
        .set_initial_value(Expr::fluent(&robot_at, [&l1]).expect("robot_at(l1)"), true)
        .expect("initial position");
    problem
        .set_initial_value(charge, 100)
        .expect("initial charge");
    problem
        .add_goal(Expr::fluent(&robot_at, [&l2]).expect("robot_at(l2)"))
        .expect("goal");

    RobotBattery {
        problem,
        location,
        robot_at,
        battery_charge,
        l1,
        l2,
    }
}

fn build_move(
    action: &mut Action,
    robot_at: &Arc<Fluent>,
    battery_charge: &Arc<Fluent>,
) -> planforge_core::Result<()> {
    let from = Expr::from(action.parameters()[0].clone());
    let to = Expr::from(action.parameters()[1].clone());
    let charge = Expr::fluent(battery_charge, Vec::<Expr>::new())?;
    let at_from = Expr::fluent(robot_at, [&from])?;
    let at_to = Expr::fluent(robot_at, [&to])?;

    action.add_precondition(Expr::ge(charge.clone(), 10)?)?;
    action.add_precondition(Expr::not(Expr::eq(&from, &to)?)?)?;
    action.add_precondition(at_from.clone())?;
    action.add_precondition(Expr::not(at_to.clone())?)?;
    action.add_effect(at_from, false)?;
    action.add_effect(at_to, true)?;
    action.add_decrease_effect(charge, 10)
}
