use planforge_core::{validate, ActionInstance, Fluent, Plan};
use planforge_test::{delivery, robot_battery, switches};

use super::*;
use crate::back_translation::ArgumentMapping;

#[test]
fn test_robot_battery_grounding_skips_conflicting_instances() {
    let rb = robot_battery();
    let result = Grounder::new().compile(&rb.problem).unwrap();

    let names: Vec<&str> = result.problem.actions().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["move_l1_l2", "move_l2_l1"]);
    assert!(result
        .problem
        .actions()
        .iter()
        .all(|a| a.parameters().is_empty()));
    assert_eq!(result.back_translator.len(), 2);
}

#[test]
fn test_grounded_plan_translates_to_parameterised_plan() {
    let rb = robot_battery();
    let result = Grounder::new().compile(&rb.problem).unwrap();

    let grounded = Plan::new(vec![ActionInstance::new("move_l1_l2", vec![])]);
    assert!(validate(&result.problem, &grounded).unwrap().is_valid());
    assert_eq!(result.back_translator.translate(&grounded).unwrap(), rb.plan());
}

#[test]
fn test_grounded_conditions_are_substituted() {
    let rb = robot_battery();
    let result = Grounder::new().compile(&rb.problem).unwrap();
    let action = result.problem.action("move_l1_l2").unwrap();
    let rendered: Vec<String> = action.preconditions().iter().map(|p| p.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "(battery_charge >= 10)",
            "(not (l1 == l2))",
            "robot_at(l1)",
            "(not robot_at(l2))",
        ]
    );
}

#[test]
fn test_delivery_respects_type_hierarchy() {
    let d = delivery();
    let result = Grounder::new().compile(&d.problem).unwrap();

    // drive: 1 truck x 2 x 2 minus 2 self loops; load/unload: 1 x 1 x 2 each
    assert_eq!(result.problem.actions().len(), 2 + 2 + 2);
    assert!(result.problem.action("drive_truck1_depot_shop").is_some());

    let grounded = Plan::new(vec![
        ActionInstance::new("load_parcel_truck1_depot", vec![]),
        ActionInstance::new("drive_truck1_depot_shop", vec![]),
        ActionInstance::new("unload_parcel_truck1_shop", vec![]),
    ]);
    let verdict = validate(&result.problem, &grounded).unwrap();
    assert!(verdict.is_valid());
    assert_eq!(result.back_translator.translate(&grounded).unwrap(), d.plan());
}

#[test]
fn test_guards_are_grounded() {
    let sw = switches();
    let result = Grounder::new().compile(&sw.problem).unwrap();
    let toggle = result.problem.action("toggle_s1").unwrap();
    assert!(toggle.effects().iter().all(|e| e.condition().unwrap().is_ground()));

    let grounded = Plan::new(vec![
        ActionInstance::new("toggle_s1", vec![]),
        ActionInstance::new("toggle_s2", vec![]),
    ]);
    assert!(validate(&result.problem, &grounded).unwrap().is_valid());
}

#[test]
fn test_parameterless_actions_keep_their_name() {
    let mut problem = Problem::new("bell");
    let rung = problem
        .add_fluent_with_default(Fluent::boolean("rung", vec![]).unwrap(), false)
        .unwrap();
    let mut ring = Action::new("ring", vec![]).unwrap();
    ring.add_effect(Expr::fluent(&rung, Vec::<Expr>::new()).unwrap(), true)
        .unwrap();
    problem.add_action(ring).unwrap();

    let result = Grounder::new().compile(&problem).unwrap();
    assert!(result.problem.action("ring").is_some());
    assert_eq!(
        result.back_translator.get("ring").map(|t| &t.arguments),
        Some(&ArgumentMapping::Constant(vec![]))
    );
}

#[test]
fn test_ungrounded_plan_does_not_translate() {
    let rb = robot_battery();
    let result = Grounder::new().compile(&rb.problem).unwrap();
    assert!(result.back_translator.translate(&rb.plan()).is_err());
}
