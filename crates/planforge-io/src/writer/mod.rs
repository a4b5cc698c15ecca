//! PDDL writer.


use std::collections::BTreeSet;
use std::path::Path;

use planforge_core::{
    Action, Effect, Expr, Feature, Fluent, FluentExp, GroundFluent, Problem, Value, ValueType,
};
use tracing::debug;

use crate::error::{IoError, Result};

/// Renders a problem as a PDDL domain and problem pair.
///
/// Objects referenced inside action bodies are written as domain
/// `(:constants)`, every other object goes to the problem's `(:objects)`.
/// Numeric fluents become `number` functions; their bounds and integrality
/// are not expressible in PDDL and are dropped.
#[derive(Debug, Clone, Copy)]
pub struct PddlWriter<'a> {
    problem: &'a Problem,
}

impl<'a> PddlWriter<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Name of the problem in PDDL syntax.
    pub fn problem_name(&self) -> String {
        identifier(self.problem.name())
    }

    pub fn domain_name(&self) -> String {
        format!("{}-domain", self.problem_name())
    }

    pub fn write_domain(&self) -> Result<String> {
        let problem = self.problem;
        let mut out = format!("(define (domain {})\n", self.domain_name());
        out.push_str(&format!("  (:requirements {})\n", self.requirements().join(" ")));

        let types: Vec<String> = problem
            .types()
            .iter()
            .filter(|t| t.name() != "object")
            .map(|t| match t.parent() {
                Some(parent) => format!("{} - {}", t.name(), parent.name()),
                None => t.name().to_string(),
            })
            .collect();
        section(&mut out, "  ", ":types", &types);

        let constants = self.constants();
        let constants: Vec<String> = problem
            .objects()
            .iter()
            .filter(|o| constants.contains(o.name()))
            .map(|o| format!("{} - {}", o.name(), o.user_type().name()))
            .collect();
        section(&mut out, "  ", ":constants", &constants);

        let mut predicates = Vec::new();
        let mut functions = Vec::new();
        for fluent in problem.fluents() {
            match fluent.value_type() {
                ValueType::Bool => predicates.push(signature(fluent)),
                ValueType::Int { .. } | ValueType::Real { .. } => {
                    functions.push(format!("{} - number", signature(fluent)))
                }
                ValueType::Object(_) => {
                    return Err(IoError::Unsupported(format!(
                        "object-valued fluent {}",
                        fluent.name()
                    )))
                }
            }
        }
        section(&mut out, "  ", ":predicates", &predicates);
        section(&mut out, "  ", ":functions", &functions);

        for action in problem.actions() {
            out.push_str(&write_action(action)?);
        }
        out.push_str(")\n");

        debug!(event = "pddl_domain_written", domain = %self.domain_name(), bytes = out.len());
        Ok(out)
    }

    pub fn write_problem(&self) -> Result<String> {
        let problem = self.problem;
        let mut out = format!("(define (problem {})\n", self.problem_name());
        out.push_str(&format!("  (:domain {})\n", self.domain_name()));

        let constants = self.constants();
        let objects: Vec<String> = problem
            .objects()
            .iter()
            .filter(|o| !constants.contains(o.name()))
            .map(|o| format!("{} - {}", o.name(), o.user_type().name()))
            .collect();
        section(&mut out, "  ", ":objects", &objects);

        let mut facts = Vec::new();
        for fluent in problem.fluents() {
            for ground in problem.ground_applications(fluent) {
                let fact = match problem.initial_value(&ground) {
                    None | Some(Value::Bool(false)) => continue,
                    Some(Value::Bool(true)) => ground_atom(&ground),
                    Some(value @ (Value::Int(_) | Value::Real(_))) => {
                        format!("(= {} {})", ground_atom(&ground), number(value)?)
                    }
                    Some(Value::Object(_)) => {
                        return Err(IoError::Unsupported(format!(
                            "object-valued fluent {}",
                            fluent.name()
                        )))
                    }
                };
                facts.push(fact);
            }
        }
        section(&mut out, "  ", ":init", &facts);

        let goals = problem
            .goals()
            .iter()
            .map(write_expr)
            .collect::<Result<Vec<_>>>()?;
        out.push_str(&format!("  (:goal {})\n", conjunction(&goals, "    ")));
        out.push_str(")\n");

        debug!(event = "pddl_problem_written", problem = %self.problem_name(), bytes = out.len());
        Ok(out)
    }

    pub fn write_domain_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.write_domain()?)?;
        Ok(())
    }

    pub fn write_problem_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.write_problem()?)?;
        Ok(())
    }

    fn requirements(&self) -> Vec<&'static str> {
        let kind = self.problem.kind();
        let mut requirements = vec![":strips"];
        let optional = [
            (Feature::FlatTyping, ":typing"),
            (Feature::HierarchicalTyping, ":typing"),
            (Feature::NegativeConditions, ":negative-preconditions"),
            (Feature::DisjunctiveConditions, ":disjunctive-preconditions"),
            (Feature::Equalities, ":equality"),
            (Feature::NumericFluents, ":numeric-fluents"),
            (Feature::ConditionalEffects, ":conditional-effects"),
        ];
        for (feature, requirement) in optional {
            if kind.has(feature) && !requirements.contains(&requirement) {
                requirements.push(requirement);
            }
        }
        requirements
    }

    /// Names of objects mentioned by action bodies.
    fn constants(&self) -> BTreeSet<&'a str> {
        let mut names = BTreeSet::new();
        for action in self.problem.actions() {
            for expr in action.expressions() {
                expr.walk(&mut |e| {
                    if let Expr::Object(o) = e {
                        names.insert(o.name());
                    }
                });
            }
        }
        names
    }
}

fn identifier(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "problem".to_string()
    } else {
        cleaned
    }
}

/// Writes `(<keyword>\n  entries...\n)`, or nothing for an empty section.
fn section(out: &mut String, indent: &str, keyword: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("{indent}({keyword}\n"));
    for entry in entries {
        out.push_str(&format!("{indent}  {entry}\n"));
    }
    out.push_str(&format!("{indent})\n"));
}

fn conjunction(parts: &[String], indent: &str) -> String {
    match parts {
        [] => "(and)".to_string(),
        [single] => single.clone(),
        _ => {
            let body: Vec<String> = parts.iter().map(|p| format!("{indent}{p}")).collect();
            format!("(and\n{}\n{})", body.join("\n"), &indent[..indent.len() - 2])
        }
    }
}

fn signature(fluent: &Fluent) -> String {
    let mut out = format!("({}", fluent.name());
    for p in fluent.parameters() {
        out.push_str(&format!(" ?{} - {}", p.name(), p.user_type().name()));
    }
    out.push(')');
    out
}

fn write_action(action: &Action) -> Result<String> {
    let parameters: Vec<String> = action
        .parameters()
        .iter()
        .map(|p| format!("?{} - {}", p.name(), p.user_type().name()))
        .collect();
    let preconditions = action
        .preconditions()
        .iter()
        .map(write_expr)
        .collect::<Result<Vec<_>>>()?;
    let effects = action
        .effects()
        .iter()
        .map(write_effect)
        .collect::<Result<Vec<_>>>()?;

    let mut out = format!("  (:action {}\n", action.name());
    out.push_str(&format!("    :parameters ({})\n", parameters.join(" ")));
    if !preconditions.is_empty() {
        out.push_str(&format!(
            "    :precondition {}\n",
            conjunction(&preconditions, "      ")
        ));
    }
    out.push_str(&format!("    :effect {}\n", conjunction(&effects, "      ")));
    out.push_str("  )\n");
    Ok(out)
}

fn write_effect(effect: &Effect) -> Result<String> {
    let target = effect.target();
    let atom = fluent_atom(target)?;
    let body = match target.value_type() {
        ValueType::Bool => match effect.value() {
            Expr::Bool(true) => atom,
            Expr::Bool(false) => format!("(not {atom})"),
            other => {
                return Err(IoError::Unsupported(format!(
                    "non-constant boolean assignment {target} := {other}"
                )))
            }
        },
        ValueType::Int { .. } | ValueType::Real { .. } => {
            numeric_effect(target, &atom, effect.value())?
        }
        ValueType::Object(_) => {
            return Err(IoError::Unsupported(format!(
                "object-valued fluent {}",
                target.fluent().name()
            )))
        }
    };
    match effect.condition() {
        Some(condition) => Ok(format!("(when {} {body})", write_expr(condition)?)),
        None => Ok(body),
    }
}

fn numeric_effect(target: &FluentExp, atom: &str, value: &Expr) -> Result<String> {
    let is_target = |e: &Expr| matches!(e, Expr::Fluent(f) if f == target);
    Ok(match value {
        Expr::Plus(l, r) if is_target(l) => format!("(increase {atom} {})", write_expr(r)?),
        Expr::Minus(l, r) if is_target(l) => format!("(decrease {atom} {})", write_expr(r)?),
        other => format!("(assign {atom} {})", write_expr(other)?),
    })
}

fn fluent_atom(application: &FluentExp) -> Result<String> {
    let mut out = format!("({}", application.fluent().name());
    for arg in application.args() {
        out.push(' ');
        out.push_str(&write_expr(arg)?);
    }
    out.push(')');
    Ok(out)
}

fn ground_atom(ground: &GroundFluent) -> String {
    let mut out = format!("({}", ground.fluent());
    for arg in ground.arguments() {
        out.push(' ');
        out.push_str(arg.name());
    }
    out.push(')');
    out
}

fn number(value: &Value) -> Result<String> {
    match value {
        Value::Int(i) => Ok(i.to_string()),
        Value::Real(r) if r.0.is_finite() => Ok(r.0.to_string()),
        other => Err(IoError::Unsupported(format!("value {other}"))),
    }
}

fn write_expr(expr: &Expr) -> Result<String> {
    fn nary(op: &str, operands: &[Expr]) -> Result<String> {
        let mut out = format!("({op}");
        for operand in operands {
            out.push(' ');
            out.push_str(&write_expr(operand)?);
        }
        out.push(')');
        Ok(out)
    }
    fn binary(op: &str, l: &Expr, r: &Expr) -> Result<String> {
        Ok(format!("({op} {} {})", write_expr(l)?, write_expr(r)?))
    }

    match expr {
        Expr::Bool(true) => Ok("(and)".to_string()),
        Expr::Bool(false) => Ok("(or)".to_string()),
        Expr::Int(i) => number(&Value::Int(*i)),
        Expr::Real(r) => number(&Value::Real(*r)),
        Expr::Object(o) => Ok(o.name().to_string()),
        Expr::Param(p) => Ok(format!("?{}", p.name())),
        Expr::Fluent(application) => {
            if application.value_type().as_user_type().is_some() {
                return Err(IoError::Unsupported(format!(
                    "object-valued fluent {}",
                    application.fluent().name()
                )));
            }
            fluent_atom(application)
        }
        Expr::And(xs) => nary("and", xs),
        Expr::Or(xs) => nary("or", xs),
        Expr::Not(x) => Ok(format!("(not {})", write_expr(x)?)),
        Expr::Implies(l, r) => binary("imply", l, r),
        Expr::Eq(l, r) => binary("=", l, r),
        Expr::Lt(l, r) => binary("<", l, r),
        Expr::Le(l, r) => binary("<=", l, r),
        Expr::Gt(l, r) => binary(">", l, r),
        Expr::Ge(l, r) => binary(">=", l, r),
        Expr::Plus(l, r) => binary("+", l, r),
        Expr::Minus(l, r) => binary("-", l, r),
        Expr::Times(l, r) => binary("*", l, r),
        Expr::Div(l, r) => binary("/", l, r),
    }
}
