//! PlanForge Compiler - problem rewriting with plan back-translation
//!
//! A compiler turns a [`Problem`](planforge_core::Problem) into a new,
//! equivalent problem that avoids some language feature, together with a
//! [`BackTranslator`] that maps plans of the rewritten problem back to plans
//! of the original. Compilers never mutate their input.
//!
//! - [`NegativeConditionsRemover`] - replaces negated fluents by shadow fluents
//! - [`Grounder`] - replaces parameterised actions by ground ones
//! - [`Pipeline`] - runs compilers in sequence and composes their translators

pub mod back_translation;
pub mod compiler;
pub mod error;
pub mod grounder;
pub mod naming;
pub mod negative_conditions;
pub mod pipeline;

pub use back_translation::{ActionTranslation, ArgumentMapping, BackTranslator};
pub use compiler::{CompilationKind, CompilationResult, Compiler};
pub use error::{CompilerError, Result};
pub use grounder::Grounder;
pub use negative_conditions::NegativeConditionsRemover;
pub use pipeline::Pipeline;
