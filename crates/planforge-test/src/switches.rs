//! Two switches toggled through conditional effects.
//!
//! `toggle(s)` flips `on(s)` with a pair of guarded effects. Initially `s2`
//! is on and `s1` is off; the goal is `on(s1) and not on(s2)`.

use std::sync::Arc;

use planforge_core::{
    Action, ActionInstance, Expr, Fluent, Object, Parameter, Plan, Problem, UserType,
};

#[derive(Clone, Debug)]
pub struct Switches {
    pub problem: Problem,
    pub on: Arc<Fluent>,
    pub s1: Object,
    pub s2: Object,
}

impl Switches {
    /// `[toggle(s1), toggle(s2)]`.
    pub fn plan(&self) -> Plan {
        Plan::new(vec![
            ActionInstance::new("toggle", vec![self.s1.clone()]),
            ActionInstance::new("toggle", vec![self.s2.clone()]),
        ])
    }
}

pub fn switches() -> Switches {
    let switch = UserType::new("Switch");
    let mut problem = Problem::new("switches");

    let on = problem
        .add_fluent_with_default(
            Fluent::boolean("on", vec![Parameter::new("s", &switch)]).expect("on signature"),
            false,
        )
        .expect("on fluent");

    let mut toggle =
        Action::new("toggle", vec![Parameter::new("s", &switch)]).expect("toggle signature");
    let s = Expr::from(toggle.parameters()[0].clone());
    let on_s = Expr::fluent(&on, [&s]).expect("on(s)");
    toggle
        .add_conditional_effect(on_s.clone(), on_s.clone(), false)
        .expect("switch off");
    toggle
        .add_conditional_effect(Expr::not(on_s.clone()).expect("not on(s)"), on_s, true)
        .expect("switch on");
    problem.add_action(toggle).expect("toggle action");

    let s1 = Object::new("s1", &switch);
    let s2 = Object::new("s2", &switch);
    problem
        .add_objects([s1.clone(), s2.clone()])
        .expect("switch objects");
    problem
        .set_initial_value(Expr::fluent(&on, [&s2]).expect("on(s2)"), true)
        .expect("initial on(s2)");

    let on_s1 = Expr::fluent(&on, [&s1]).expect("on(s1)");
    let off_s2 = Expr::not(Expr::fluent(&on, [&s2]).expect("on(s2)")).expect("not on(s2)");
    problem.add_goal(on_s1).expect("goal on(s1)");
    problem.add_goal(off_s2).expect("goal not on(s2)");

    Switches {
        problem,
        on,
        s1,
        s2,
    }
}
