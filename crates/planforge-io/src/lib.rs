//! PlanForge IO - PDDL interchange
//!
//! [`PddlWriter`] renders a [`Problem`](planforge_core::Problem) as a PDDL
//! domain and problem pair; [`PddlReader`] parses such a pair back into a
//! problem. Supported requirements are `:strips`, `:typing`,
//! `:negative-preconditions`, `:disjunctive-preconditions`, `:equality`,
//! `:numeric-fluents` and `:conditional-effects`.
//!
//! PDDL is closed world: predicates not listed in `(:init)` start false.
//!
//! ```
//! use planforge_io::{PddlReader, PddlWriter};
//!
//! let domain = r#"
//!     (define (domain lights)
//!       (:requirements :strips :negative-preconditions)
//!       (:predicates (lit))
//!       (:action switch_on
//!         :precondition (not (lit))
//!         :effect (lit)))
//! "#;
//! let problem = "(define (problem dark) (:domain lights) (:goal (lit)))";
//!
//! let parsed = PddlReader::new().parse_problem_str(domain, problem).unwrap();
//! assert_eq!(parsed.name(), "dark");
//! assert_eq!(parsed.actions().len(), 1);
//!
//! let written = PddlWriter::new(&parsed).write_domain().unwrap();
//! assert!(written.contains("(:action switch_on"));
//! ```

pub mod error;
pub mod reader;
mod sexpr;
pub mod writer;

pub use error::{IoError, Result};
pub use reader::PddlReader;
pub use writer::PddlWriter;
