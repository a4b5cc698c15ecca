//! Structural computation of the problem kind.

use crate::expr::Expr;
use crate::kind::{Feature, ProblemKind};
use crate::types::ValueType;

use super::Problem;

pub(super) fn compute(problem: &Problem) -> ProblemKind {
    let mut kind = ProblemKind::new().with(Feature::ActionBased);

    if !problem.types.is_empty() {
        if problem.types.iter().any(|t| t.parent().is_some()) {
            kind.set(Feature::HierarchicalTyping);
        } else {
            kind.set(Feature::FlatTyping);
        }
    }

    for fluent in &problem.fluents {
        match fluent.value_type() {
            ValueType::Int { .. } => {
                kind.set(Feature::NumericFluents);
                kind.set(Feature::DiscreteNumbers);
            }
            ValueType::Real { .. } => {
                kind.set(Feature::NumericFluents);
                kind.set(Feature::ContinuousNumbers);
            }
            ValueType::Object(_) => kind.set(Feature::ObjectFluents),
            ValueType::Bool => {}
        }
    }

    for action in &problem.actions {
        for condition in action.preconditions() {
            visit_condition(condition, &mut kind);
        }
        for effect in action.effects() {
            if let Some(guard) = effect.condition() {
                kind.set(Feature::ConditionalEffects);
                visit_condition(guard, &mut kind);
            }
            visit_numbers(effect.value(), &mut kind);
        }
    }

    for goal in &problem.goals {
        visit_condition(goal, &mut kind);
    }

    kind
}

fn visit_condition(condition: &Expr, kind: &mut ProblemKind) {
    let nnf = condition.to_nnf();
    nnf.walk(&mut |e| match e {
        Expr::Not(inner) if matches!(inner.as_ref(), Expr::Fluent(_)) => {
            kind.set(Feature::NegativeConditions)
        }
        Expr::Or(_) => kind.set(Feature::DisjunctiveConditions),
        Expr::Eq(..) => kind.set(Feature::Equalities),
        _ => {}
    });
    visit_numbers(condition, kind);
}

fn visit_numbers(expr: &Expr, kind: &mut ProblemKind) {
    expr.walk(&mut |e| match e {
        Expr::Real(_) => kind.set(Feature::ContinuousNumbers),
        Expr::Int(_) => kind.set(Feature::DiscreteNumbers),
        _ => {}
    });
}
