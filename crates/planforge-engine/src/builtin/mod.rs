//! Reference engines registered in the global registry.
//!
//! - [`BreadthFirstPlanner`] - ground forward breadth-first search
//! - [`SequentialPlanValidator`] - step-by-step plan validation

mod breadth_first;
mod validator;

#[cfg(test)]
mod tests;

pub use breadth_first::BreadthFirstPlanner;
pub use validator::SequentialPlanValidator;
