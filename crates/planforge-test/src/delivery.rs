//! Parcel delivery with a typed object hierarchy.
//!
//! `Package` and `Truck` are both `Locatable`, so the single `at` fluent
//! tracks where trucks and parcels are. Driving burns one unit of integer
//! fuel.

use std::sync::Arc;

use planforge_core::{
    Action, ActionInstance, Expr, Fluent, Object, Parameter, Plan, Problem, UserType, ValueType,
};

#[derive(Clone, Debug)]
pub struct Delivery {
    pub problem: Problem,
    pub at: Arc<Fluent>,
    pub in_truck: Arc<Fluent>,
    pub fuel: Arc<Fluent>,
    pub depot: Object,
    pub shop: Object,
    pub truck: Object,
    pub parcel: Object,
}

impl Delivery {
    /// Load at the depot, drive to the shop, unload.
    pub fn plan(&self) -> Plan {
        Plan::new(vec![
            ActionInstance::new(
                "load",
                vec![self.parcel.clone(), self.truck.clone(), self.depot.clone()],
            ),
            ActionInstance::new(
                "drive",
                vec![self.truck.clone(), self.depot.clone(), self.shop.clone()],
            ),
            ActionInstance::new(
                "unload",
                vec![self.parcel.clone(), self.truck.clone(), self.shop.clone()],
            ),
        ])
    }
}

pub fn delivery() -> Delivery {
    let locatable = UserType::new("Locatable");
    let package = UserType::with_parent("Package", &locatable);
    let truck_type = UserType::with_parent("Truck", &locatable);
    let location = UserType::new("Location");

    let mut problem = Problem::new("delivery");
    let at = problem
        .add_fluent_with_default(
            Fluent::boolean(
                "at",
                vec![
                    Parameter::new("x", &locatable),
                    Parameter::new("l", &location),
                ],
            )
            .expect("at signature"),
            false,
        )
        .expect("at fluent");
    let in_truck = problem
        .add_fluent_with_default(
            Fluent::boolean(
                "in_truck",
                vec![
                    Parameter::new("p", &package),
                    Parameter::new("t", &truck_type),
                ],
            )
            .expect("in_truck signature"),
            false,
        )
        .expect("in_truck fluent");
    let fuel = problem
        .add_fluent(
            Fluent::new(
                "fuel",
                ValueType::bounded_int(0, 10),
                vec![Parameter::new("t", &truck_type)],
            )
            .expect("fuel signature"),
        )
        .expect("fuel fluent");

    let drive = build_drive(&truck_type, &location, &at, &fuel).expect("drive action");
    let load = build_load(&package, &truck_type, &location, &at, &in_truck).expect("load action");
    let unload =
        build_unload(&package, &truck_type, &location, &at, &in_truck).expect("unload action");
    for action in [drive, load, unload] {
        problem.add_action(action).expect("add action");
    }

    let depot = Object::new("depot", &location);
    let shop = Object::new("shop", &location);
    let truck = Object::new("truck1", &truck_type);
    let parcel = Object::new("parcel", &package);
    problem
        .add_objects([depot.clone(), shop.clone(), truck.clone(), parcel.clone()])
        .expect("objects");

    problem
        .set_initial_value(Expr::fluent(&at, [&truck, &depot]).expect("at(truck1, depot)"), true)
        .expect("truck position");
    problem
        .set_initial_value(Expr::fluent(&at, [&parcel, &depot]).expect("at(parcel, depot)"), true)
        .expect("parcel position");
    problem
        .set_initial_value(Expr::fluent(&fuel, [&truck]).expect("fuel(truck1)"), 3)
        .expect("fuel level");
    problem
        .add_goal(Expr::fluent(&at, [&parcel, &shop]).expect("at(parcel, shop)"))
        .expect("goal");

    Delivery {
        problem,
        at,
        in_truck,
        fuel,
        depot,
        shop,
        truck,
        parcel,
    }
}

fn build_drive(
    truck: &UserType,
    location: &UserType,
    at: &Arc<Fluent>,
    fuel: &Arc<Fluent>,
) -> planforge_core::Result<Action> {
    let t = Parameter::new("t", truck);
    let from = Parameter::new("from", location);
    let to = Parameter::new("to", location);
    let mut drive = Action::new("drive", vec![t.clone(), from.clone(), to.clone()])?;

    let fuel_t = Expr::fluent(fuel, [&t])?;
    drive.add_precondition(Expr::fluent(at, [&t, &from])?)?;
    drive.add_precondition(Expr::ge(fuel_t.clone(), 1)?)?;
    drive.add_precondition(Expr::not(Expr::eq(&from, &to)?)?)?;
    drive.add_effect(Expr::fluent(at, [&t, &from])?, false)?;
    drive.add_effect(Expr::fluent(at, [&t, &to])?, true)?;
    drive.add_decrease_effect(fuel_t, 1)?;
    Ok(drive)
}

fn build_load(
    package: &UserType,
    truck: &UserType,
    location: &UserType,
    at: &Arc<Fluent>,
    in_truck: &Arc<Fluent>,
) -> planforge_core::Result<Action> {
    let p = Parameter::new("p", package);
    let t = Parameter::new("t", truck);
    let l = Parameter::new("l", location);
    let mut load = Action::new("load", vec![p.clone(), t.clone(), l.clone()])?;

    load.add_precondition(Expr::fluent(at, [&p, &l])?)?;
    load.add_precondition(Expr::fluent(at, [&t, &l])?)?;
    load.add_effect(Expr::fluent(at, [&p, &l])?, false)?;
    load.add_effect(Expr::fluent(in_truck, [&p, &t])?, true)?;
    Ok(load)
}

fn build_unload(
    package: &UserType,
    truck: &UserType,
    location: &UserType,
    at: &Arc<Fluent>,
    in_truck: &Arc<Fluent>,
) -> planforge_core::Result<Action> {
    let p = Parameter::new("p", package);
    let t = Parameter::new("t", truck);
    let l = Parameter::new("l", location);
    let mut unload = Action::new("unload", vec![p.clone(), t.clone(), l.clone()])?;

    unload.add_precondition(Expr::fluent(in_truck, [&p, &t])?)?;
    unload.add_precondition(Expr::fluent(at, [&t, &l])?)?;
    unload.add_effect(Expr::fluent(in_truck, [&p, &t])?, false)?;
    unload.add_effect(Expr::fluent(at, [&p, &l])?, true)?;
    Ok(unload)
}
