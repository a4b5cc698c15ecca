//! Shared test fixtures for PlanForge crates.
//!
//! Each fixture builds a small, complete [`Problem`](planforge_core::Problem)
//! together with handles to its fluents and objects and a known valid plan.
//!
//! - [`robot`] - two-location robot with a battery (negative preconditions, real fluent)
//! - [`switches`] - toggling switches (conditional effects, negative goal)
//! - [`delivery`] - truck and parcel logistics (type hierarchy, integer fluent)
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```
//!
//! Then build the fixture you need:
//!
//! ```ignore
//! use planforge_test::robot::robot_battery;
//!
//! let rb = robot_battery();
//! let plan = rb.plan();
//! ```

pub mod delivery;
pub mod robot;
pub mod switches;

pub use delivery::{delivery, Delivery};
pub use robot::{robot_battery, RobotBattery};
pub use switches::{switches, Switches};
