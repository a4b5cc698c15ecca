//! Sequential composition of compilers.

use planforge_core::{Problem, ProblemKind};
use tracing::info;

use crate::back_translation::BackTranslator;
use crate::compiler::{CompilationResult, Compiler};
use crate::error::Result;

/// An ordered list of compilers applied one after another.
///
/// The back translators of the stages are composed into a single table that
/// maps plans of the final problem straight to plans of the input.
///
/// # Example
///
/// ```
/// use planforge_compiler::{Grounder, NegativeConditionsRemover, Pipeline};
///
/// let pipeline = Pipeline::new()
///     .with(NegativeConditionsRemover::new())
///     .with(Grounder::new());
/// assert_eq!(pipeline.names(), vec!["negative_conditions_remover", "grounder"]);
/// ```
#[derive(Debug, Default)]
pub struct Pipeline {
    compilers: Vec<Box<dyn Compiler>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a compiler.
    pub fn with<C: Compiler + 'static>(mut self, compiler: C) -> Self {
        self.compilers.push(Box::new(compiler));
        self
    }

    pub fn push(&mut self, compiler: Box<dyn Compiler>) {
        self.compilers.push(compiler);
    }

    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.compilers.iter().map(|c| c.name()).collect()
    }

    /// The kind the last stage would produce for an input of kind `kind`.
    pub fn resulting_kind(&self, kind: &ProblemKind) -> ProblemKind {
        self.compilers
            .iter()
            .fold(kind.clone(), |k, c| c.resulting_kind(&k))
    }

    /// Runs every stage in order. An empty pipeline returns a copy of the
    /// problem with the identity table.
    pub fn compile(&self, problem: &Problem) -> Result<CompilationResult> {
        let mut current = CompilationResult {
            problem: problem.clone(),
            back_translator: BackTranslator::identity(problem),
        };
        for compiler in &self.compilers {
            let stage = compiler.compile(&current.problem)?;
            current = CompilationResult {
                back_translator: current.back_translator.compose(&stage.back_translator),
                problem: stage.problem,
            };
        }
        info!(
            event = "pipeline_end",
            stages = self.compilers.len() as u64,
            kind = %current.problem.kind(),
        );
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use planforge_core::{validate, ActionInstance, Feature, Plan};
    use planforge_test::{robot_battery, switches};

    use super::*;
    use crate::error::CompilerError;
    use crate::{CompilationKind, Grounder, NegativeConditionsRemover};

    #[derive(Debug)]
    struct StripsOnly;

    impl Compiler for StripsOnly {
        fn name(&self) -> &str {
            "strips_only"
        }

        fn compilation_kind(&self) -> CompilationKind {
            CompilationKind::Grounding
        }

        fn supported_kind(&self) -> ProblemKind {
            ProblemKind::from_features([Feature::ActionBased, Feature::FlatTyping])
        }

        fn resulting_kind(&self, kind: &ProblemKind) -> ProblemKind {
            kind.clone()
        }

        fn compile(&self, problem: &Problem) -> Result<CompilationResult> {
            crate::compiler::ensure_supported(self, problem)?;
            unreachable!("only used on unsupported problems")
        }
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let rb = robot_battery();
        let result = Pipeline::new().compile(&rb.problem).unwrap();
        assert_eq!(result.problem, rb.problem);
        assert_eq!(result.back_translator.translate(&rb.plan()).unwrap(), rb.plan());
    }

    #[test]
    fn test_remove_then_ground() {
        let rb = robot_battery();
        let pipeline = Pipeline::new()
            .with(NegativeConditionsRemover::new())
            .with(Grounder::new());
        let result = pipeline.compile(&rb.problem).unwrap();

        assert!(!result.problem.kind().has_negative_conditions());
        assert!(!pipeline
            .resulting_kind(rb.problem.kind())
            .has_negative_conditions());

        let grounded = Plan::new(vec![ActionInstance::new("move_l1_l2", vec![])]);
        let verdict = validate(&result.problem, &grounded).unwrap();
        assert!(verdict.is_valid());
        assert_eq!(result.back_translator.translate(&grounded).unwrap(), rb.plan());
    }

    #[test]
    fn test_ground_then_remove() {
        let sw = switches();
        let pipeline = Pipeline::new()
            .with(Grounder::new())
            .with(NegativeConditionsRemover::new());
        let result = pipeline.compile(&sw.problem).unwrap();

        let grounded = Plan::new(vec![
            ActionInstance::new("toggle_s1", vec![]),
            ActionInstance::new("toggle_s2", vec![]),
        ]);
        assert!(validate(&result.problem, &grounded).unwrap().is_valid());
        assert_eq!(result.back_translator.translate(&grounded).unwrap(), sw.plan());
    }

    #[test]
    fn test_unsupported_problem_reports_features() {
        let rb = robot_battery();
        let err = Pipeline::new()
            .with(StripsOnly)
            .compile(&rb.problem)
            .unwrap_err();
        match err {
            CompilerError::UnsupportedProblem { compiler, features } => {
                assert_eq!(compiler, "strips_only");
                assert!(features.contains(&Feature::NegativeConditions));
                assert!(!features.contains(&Feature::ActionBased));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
