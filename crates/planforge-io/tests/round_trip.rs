//! Writing, reading and writing again yields the same PDDL text.

use planforge_core::{ActionInstance, Plan, PlanValidator, Problem, Value};
use planforge_io::{PddlReader, PddlWriter};
use planforge_test::{delivery, robot_battery, switches};

fn write(problem: &Problem) -> (String, String) {
    let writer = PddlWriter::new(problem);
    (writer.write_domain().unwrap(), writer.write_problem().unwrap())
}

fn read((domain, problem): &(String, String)) -> Problem {
    PddlReader::new().parse_problem_str(domain, problem).unwrap()
}

/// Rebuilds a plan against the objects of a re-read problem.
fn rebind(plan: &Plan, problem: &Problem) -> Plan {
    plan.iter()
        .map(|step| {
            let args = step
                .arguments()
                .iter()
                .map(|o| problem.object(o.name()).unwrap().clone())
                .collect();
            ActionInstance::new(step.action(), args)
        })
        .collect()
}

fn assert_stable(original: &Problem) -> Problem {
    let first = read(&write(original));
    let text = write(&first);
    let second = read(&text);
    assert_eq!(write(&second), text);
    second
}

#[test]
fn test_robot_round_trip() {
    let rb = robot_battery();
    let problem = assert_stable(&rb.problem);

    let result = PlanValidator::new()
        .validate(&problem, &rebind(&rb.plan(), &problem))
        .unwrap();
    assert!(result.is_valid());
    assert_eq!(
        result.final_state().unwrap().value_of("battery_charge", &[]),
        Some(&Value::real(90.0))
    );
}

#[test]
fn test_delivery_round_trip() {
    let d = delivery();
    let problem = assert_stable(&d.problem);

    let truck = problem.user_type("truck").unwrap();
    assert_eq!(truck.parent().map(|p| p.name()), Some("locatable"));
    let result = PlanValidator::new()
        .validate(&problem, &rebind(&d.plan(), &problem))
        .unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_switches_round_trip() {
    let sw = switches();
    let problem = assert_stable(&sw.problem);

    assert_eq!(problem.goals().len(), 2);
    let result = PlanValidator::new()
        .validate(&problem, &rebind(&sw.plan(), &problem))
        .unwrap();
    assert!(result.is_valid());
    assert!(!PlanValidator::new()
        .validate(&problem, &Plan::empty())
        .unwrap()
        .is_valid());
}

#[test]
fn test_files_round_trip() {
    let rb = robot_battery();
    let dir = std::env::temp_dir().join(format!("planforge-io-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let domain_path = dir.join("domain.pddl");
    let problem_path = dir.join("problem.pddl");

    let writer = PddlWriter::new(&rb.problem);
    writer.write_domain_to(&domain_path).unwrap();
    writer.write_problem_to(&problem_path).unwrap();
    let problem = PddlReader::new()
        .parse_problem(&domain_path, &problem_path)
        .unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(problem.name(), "robot");
    assert_eq!(problem.actions().len(), 1);
}
