//! PDDL reader.

#[cfg(test)]
mod tests;

use std::path::Path;

use planforge_core::{
    Action, Effect, Expr, Fluent, Object, Parameter, Problem, UserType, ValueType,
};
use tracing::{debug, info};

use crate::error::{IoError, Result};
use crate::sexpr::{self, SExpr};

/// Requirements the reader understands.
const SUPPORTED_REQUIREMENTS: &[&str] = &[
    ":strips",
    ":typing",
    ":negative-preconditions",
    ":disjunctive-preconditions",
    ":equality",
    ":numeric-fluents",
    ":fluents",
    ":conditional-effects",
];

/// The implicit root type of untyped PDDL.
const OBJECT: &str = "object";

/// Parses PDDL domain and problem files into a [`Problem`].
///
/// Predicates are declared with a `false` default, so the initial state is
/// closed world. Functions are real valued and must be initialised in
/// `(:init)`. Top-level conjunctions in preconditions and goals are split
/// into separate conditions. An action whose effect both deletes and adds
/// the same atom keeps only the add.
#[derive(Debug, Clone, Default)]
pub struct PddlReader;

impl PddlReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads and parses a domain file and a problem file.
    pub fn parse_problem(
        &self,
        domain_path: impl AsRef<Path>,
        problem_path: impl AsRef<Path>,
    ) -> Result<Problem> {
        let domain = std::fs::read_to_string(domain_path)?;
        let problem = std::fs::read_to_string(problem_path)?;
        self.parse_problem_str(&domain, &problem)
    }

    /// Parses a domain and a problem given as text.
    pub fn parse_problem_str(&self, domain: &str, problem: &str) -> Result<Problem> {
        let mut builder = Builder::default();
        let domain_name = builder.read_domain(single_form(domain)?)?;
        builder.read_problem(single_form(problem)?, &domain_name)?;

        let problem = builder.problem;
        info!(
            event = "pddl_read",
            problem = problem.name(),
            domain = %domain_name,
            actions = problem.actions().len(),
            objects = problem.objects().len(),
        );
        Ok(problem)
    }
}

fn single_form(source: &str) -> Result<SExpr> {
    let mut forms = sexpr::parse(source)?.into_iter();
    let form = forms
        .next()
        .ok_or_else(|| IoError::parse(1, "empty input"))?;
    if let Some(extra) = forms.next() {
        return Err(IoError::parse(extra.line(), "unexpected text after (define ...)"));
    }
    Ok(form)
}

/// Splits `(define (<kind> <name>) sections...)`.
fn define<'s>(form: &'s SExpr, kind: &str) -> Result<(&'s str, &'s [SExpr])> {
    let items = form.expect_list("(define ...)")?;
    if form.head() != Some("define") || items.len() < 2 {
        return Err(IoError::parse(form.line(), "expected (define ...)"));
    }
    let header = items[1].expect_list("a name declaration")?;
    match header {
        [keyword, name] if keyword.as_atom() == Some(kind) => {
            Ok((name.expect_atom("a name")?, &items[2..]))
        }
        _ => Err(IoError::parse(
            items[1].line(),
            format!("expected ({kind} <name>)"),
        )),
    }
}

/// Splits `a b - t c - u d` into `(a, Some(t)) (b, Some(t)) (c, Some(u)) (d, None)`.
fn typed_list(items: &[SExpr]) -> Result<Vec<(&str, Option<&str>, usize)>> {
    let mut entries = Vec::new();
    let mut pending: Vec<(&str, usize)> = Vec::new();
    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        let atom = item.expect_atom("a name")?;
        if atom == "-" {
            let ty = iter
                .next()
                .ok_or_else(|| IoError::parse(item.line(), "missing type after '-'"))?
                .expect_atom("a type name")?;
            if pending.is_empty() {
                return Err(IoError::parse(item.line(), "type without names"));
            }
            entries.extend(pending.drain(..).map(|(name, line)| (name, Some(ty), line)));
        } else {
            pending.push((atom, item.line()));
        }
    }
    entries.extend(pending.into_iter().map(|(name, line)| (name, None, line)));
    Ok(entries)
}

fn arity<'s>(items: &'s [SExpr], expected: usize, line: usize) -> Result<&'s [SExpr]> {
    if items.len() != expected + 1 {
        return Err(IoError::parse(
            line,
            format!(
                "{} takes {expected} operands, found {}",
                items.first().map_or_else(String::new, |h| h.to_string()),
                items.len().saturating_sub(1)
            ),
        ));
    }
    Ok(&items[1..])
}

#[derive(Default)]
struct Builder {
    problem: Problem,
}

impl Builder {
    fn read_domain(&mut self, form: SExpr) -> Result<String> {
        let (name, sections) = define(&form, "domain")?;
        self.problem.set_name(name);

        for section in sections {
            let items = section.expect_list("a domain section")?;
            let Some((_, body)) = items.split_first() else {
                return Err(IoError::parse(section.line(), "empty domain section ()"));
            };
            match section.head() {
                Some(":requirements") => check_requirements(body)?,
                Some(":types") => self.read_types(body)?,
                Some(":constants") => self.read_objects(body)?,
                Some(":predicates") => self.read_predicates(body)?,
                Some(":functions") => self.read_functions(body)?,
                Some(":action") => self.read_action(section)?,
                _ => {
                    return Err(IoError::parse(
                        section.line(),
                        format!("unsupported domain section {section}"),
                    ))
                }
            }
        }
        debug!(event = "pddl_domain_read", domain = name);
        Ok(name.to_string())
    }

    fn read_problem(&mut self, form: SExpr, domain_name: &str) -> Result<()> {
        let (name, sections) = define(&form, "problem")?;
        self.problem.set_name(name);

        for section in sections {
            let items = section.expect_list("a problem section")?;
            let Some((_, body)) = items.split_first() else {
                return Err(IoError::parse(section.line(), "empty problem section ()"));
            };
            match section.head() {
                Some(":domain") => {
                    let [domain] = body else {
                        return Err(IoError::parse(section.line(), "expected (:domain <name>)"));
                    };
                    let domain = domain.expect_atom("a domain name")?;
                    if domain != domain_name {
                        return Err(IoError::parse(
                            section.line(),
                            format!("problem is for domain {domain}, not {domain_name}"),
                        ));
                    }
                }
                Some(":requirements") => check_requirements(body)?,
                Some(":objects") => self.read_objects(body)?,
                Some(":init") => self.read_init(body)?,
                Some(":goal") => {
                    let [goal] = body else {
                        return Err(IoError::parse(section.line(), "expected (:goal <condition>)"));
                    };
                    let goal = self.expr(goal, &[])?;
                    for goal in split_conjunction(goal) {
                        self.problem.add_goal(goal)?;
                    }
                }
                _ => {
                    return Err(IoError::parse(
                        section.line(),
                        format!("unsupported problem section {section}"),
                    ))
                }
            }
        }
        Ok(())
    }

    // Declarations

    fn read_types(&mut self, body: &[SExpr]) -> Result<()> {
        let mut pending: Vec<(&str, Option<&str>, usize)> = typed_list(body)?
            .into_iter()
            .filter(|(name, _, _)| *name != OBJECT)
            .map(|(name, parent, line)| (name, parent.filter(|p| *p != OBJECT), line))
            .collect();

        // Parents that are used but never declared become root types.
        let undeclared: Vec<(&str, Option<&str>, usize)> = pending
            .iter()
            .filter_map(|(_, parent, line)| parent.map(|p| (p, *line)))
            .filter(|(p, _)| !pending.iter().any(|(name, _, _)| name == p))
            .map(|(p, line)| (p, None, line))
            .collect();
        for entry in undeclared {
            if !pending.iter().any(|(name, _, _)| *name == entry.0) {
                pending.push(entry);
            }
        }

        while !pending.is_empty() {
            let before = pending.len();
            let mut index = 0;
            while index < pending.len() {
                let (name, parent, _) = pending[index];
                let declared = match parent {
                    None => Some(UserType::new(name)),
                    Some(parent) => self
                        .problem
                        .user_type(parent)
                        .map(|p| UserType::with_parent(name, p)),
                };
                match declared {
                    Some(ty) => {
                        self.problem.add_type(&ty)?;
                        pending.remove(index);
                    }
                    None => index += 1,
                }
            }
            if pending.len() == before {
                let (name, _, line) = pending[0];
                return Err(IoError::parse(line, format!("cyclic type hierarchy at {name}")));
            }
        }
        Ok(())
    }

    fn resolve_type(&mut self, name: Option<&str>, line: usize) -> Result<UserType> {
        match name {
            None | Some(OBJECT) => {
                let root = UserType::new(OBJECT);
                if self.problem.user_type(OBJECT).is_none() {
                    self.problem.add_type(&root)?;
                }
                Ok(root)
            }
            Some(name) => self
                .problem
                .user_type(name)
                .cloned()
                .ok_or_else(|| IoError::parse(line, format!("unknown type {name}"))),
        }
    }

    fn read_objects(&mut self, body: &[SExpr]) -> Result<()> {
        for (name, ty, line) in typed_list(body)? {
            let ty = self.resolve_type(ty, line)?;
            self.problem.add_object(Object::new(name, &ty))?;
        }
        Ok(())
    }

    fn read_parameters(&mut self, items: &[SExpr]) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        for (name, ty, line) in typed_list(items)? {
            let Some(name) = name.strip_prefix('?') else {
                return Err(IoError::parse(line, format!("expected a ?variable, found {name}")));
            };
            let ty = self.resolve_type(ty, line)?;
            parameters.push(Parameter::new(name, &ty));
        }
        Ok(parameters)
    }

    /// Parses `(name ?x - t ...)` into a name and its parameters.
    fn read_signature<'s>(&mut self, decl: &'s SExpr) -> Result<(&'s str, Vec<Parameter>)> {
        let items = decl.expect_list("a declaration")?;
        let name = items
            .first()
            .ok_or_else(|| IoError::parse(decl.line(), "empty declaration"))?
            .expect_atom("a name")?;
        let parameters = self.read_parameters(&items[1..])?;
        Ok((name, parameters))
    }

    fn read_predicates(&mut self, body: &[SExpr]) -> Result<()> {
        for decl in body {
            let (name, parameters) = self.read_signature(decl)?;
            self.problem
                .add_fluent_with_default(Fluent::boolean(name, parameters)?, false)?;
        }
        Ok(())
    }

    fn read_functions(&mut self, body: &[SExpr]) -> Result<()> {
        let mut iter = body.iter().peekable();
        while let Some(decl) = iter.next() {
            let (name, parameters) = self.read_signature(decl)?;
            if iter.peek().and_then(|s| s.as_atom()) == Some("-") {
                iter.next();
                let ty = iter
                    .next()
                    .ok_or_else(|| IoError::parse(decl.line(), "missing function type"))?;
                if ty.as_atom() != Some("number") {
                    return Err(IoError::parse(
                        ty.line(),
                        format!("only numeric functions are supported, found {ty}"),
                    ));
                }
            }
            self.problem
                .add_fluent(Fluent::new(name, ValueType::real(), parameters)?)?;
        }
        Ok(())
    }

    fn read_action(&mut self, section: &SExpr) -> Result<()> {
        let items = section.expect_list("an action")?;
        let name = items
            .get(1)
            .ok_or_else(|| IoError::parse(section.line(), "action without a name"))?
            .expect_atom("an action name")?;

        let mut parameters = None;
        let mut precondition = None;
        let mut effect = None;
        let mut rest = items[2..].iter();
        while let Some(key) = rest.next() {
            let keyword = key.expect_atom("an action keyword")?;
            let value = rest
                .next()
                .ok_or_else(|| IoError::parse(key.line(), format!("missing value for {keyword}")))?;
            match keyword {
                ":parameters" => parameters = Some(value.expect_list("a parameter list")?),
                ":precondition" => precondition = Some(value),
                ":effect" => effect = Some(value),
                other => {
                    return Err(IoError::parse(
                        key.line(),
                        format!("unsupported action keyword {other}"),
                    ))
                }
            }
        }

        let parameters = self.read_parameters(parameters.unwrap_or_default())?;
        let mut action = Action::new(name, parameters)?;
        let scope = action.parameters().to_vec();
        if let Some(precondition) = precondition {
            for condition in split_conjunction(self.expr(precondition, &scope)?) {
                action.add_precondition(condition)?;
            }
        }
        if let Some(effect) = effect {
            let mut effects = Vec::new();
            self.effects(effect, &scope, None, &mut effects)?;
            for effect in drop_shadowed_deletes(effects) {
                action.push_effect(effect)?;
            }
        }
        self.problem.add_action(action)?;
        Ok(())
    }

    // Initial state

    fn read_init(&mut self, body: &[SExpr]) -> Result<()> {
        for fact in body {
            let (target, value) = match fact.head() {
                Some("=") => {
                    let ops = arity(fact.expect_list("an assignment")?, 2, fact.line())?;
                    (self.expr(&ops[0], &[])?, self.expr(&ops[1], &[])?)
                }
                Some("not") => {
                    let ops = arity(fact.expect_list("a negated fact")?, 1, fact.line())?;
                    (self.expr(&ops[0], &[])?, Expr::Bool(false))
                }
                _ => (self.expr(fact, &[])?, Expr::Bool(true)),
            };
            self.problem.set_initial_value(target, value)?;
        }
        Ok(())
    }

    // Expressions

    fn expr(&self, s: &SExpr, scope: &[Parameter]) -> Result<Expr> {
        let line = s.line();
        let items = match s {
            SExpr::Atom { text, .. } => return self.term(text, scope, line),
            SExpr::List { items, .. } => items,
        };
        let head = match items.first() {
            Some(head) => head.expect_atom("an operator")?,
            None => return Err(IoError::parse(line, "empty expression")),
        };
        let operands = |n: usize| arity(items, n, line);
        let sub = |e: &SExpr| self.expr(e, scope);

        let expr = match head {
            "and" => Expr::and(items[1..].iter().map(sub).collect::<Result<Vec<_>>>()?)?,
            "or" => Expr::or(items[1..].iter().map(sub).collect::<Result<Vec<_>>>()?)?,
            "not" => Expr::not(sub(&operands(1)?[0])?)?,
            "imply" => {
                let ops = operands(2)?;
                Expr::implies(sub(&ops[0])?, sub(&ops[1])?)?
            }
            "=" | "<" | "<=" | ">" | ">=" | "*" | "/" => {
                let ops = operands(2)?;
                let (l, r) = (sub(&ops[0])?, sub(&ops[1])?);
                match head {
                    "=" => Expr::eq(l, r)?,
                    "<" => Expr::lt(l, r)?,
                    "<=" => Expr::le(l, r)?,
                    ">" => Expr::gt(l, r)?,
                    ">=" => Expr::ge(l, r)?,
                    "*" => Expr::times(l, r)?,
                    _ => Expr::div(l, r)?,
                }
            }
            "+" => {
                let ops = operands(2)?;
                Expr::plus(sub(&ops[0])?, sub(&ops[1])?)?
            }
            "-" if items.len() == 2 => Expr::minus(0, sub(&items[1])?)?,
            "-" => {
                let ops = operands(2)?;
                Expr::minus(sub(&ops[0])?, sub(&ops[1])?)?
            }
            "forall" | "exists" => {
                return Err(IoError::parse(line, format!("quantifier {head} is not supported")))
            }
            name => {
                let fluent = self.problem.fluent(name).ok_or_else(|| {
                    IoError::parse(line, format!("unknown predicate or function {name}"))
                })?;
                let args = items[1..].iter().map(sub).collect::<Result<Vec<_>>>()?;
                Expr::fluent(fluent, args)?
            }
        };
        Ok(expr)
    }

    fn term(&self, text: &str, scope: &[Parameter], line: usize) -> Result<Expr> {
        if let Some(variable) = text.strip_prefix('?') {
            return scope
                .iter()
                .find(|p| p.name() == variable)
                .map(Expr::from)
                .ok_or_else(|| IoError::parse(line, format!("unbound variable ?{variable}")));
        }
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Expr::Int(i));
        }
        if text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
            if let Ok(r) = text.parse::<f64>() {
                return Ok(Expr::real(r));
            }
        }
        self.problem
            .object(text)
            .map(Expr::from)
            .ok_or_else(|| IoError::parse(line, format!("unknown object {text}")))
    }

    /// Flattens an effect tree into `out`, conjoining nested `when` guards.
    fn effects(
        &self,
        s: &SExpr,
        scope: &[Parameter],
        guard: Option<&Expr>,
        out: &mut Vec<Effect>,
    ) -> Result<()> {
        let line = s.line();
        let items = s.expect_list("an effect")?;
        let (target, value) = match s.head() {
            Some("and") => {
                for item in &items[1..] {
                    self.effects(item, scope, guard, out)?;
                }
                return Ok(());
            }
            Some("when") => {
                let ops = arity(items, 2, line)?;
                let condition = self.expr(&ops[0], scope)?;
                let condition = match guard {
                    Some(outer) => Expr::and([outer.clone(), condition])?,
                    None => condition,
                };
                return self.effects(&ops[1], scope, Some(&condition), out);
            }
            Some("not") => {
                let ops = arity(items, 1, line)?;
                (self.expr(&ops[0], scope)?, Expr::Bool(false))
            }
            Some(op @ ("assign" | "increase" | "decrease")) => {
                let ops = arity(items, 2, line)?;
                let target = self.expr(&ops[0], scope)?;
                let amount = self.expr(&ops[1], scope)?;
                let value = match op {
                    "assign" => amount,
                    "increase" => Expr::plus(&target, amount)?,
                    _ => Expr::minus(&target, amount)?,
                };
                (target, value)
            }
            Some("forall") => {
                return Err(IoError::parse(line, "quantified effects are not supported"))
            }
            _ => (self.expr(s, scope)?, Expr::Bool(true)),
        };
        let effect = match guard {
            Some(condition) => Effect::conditional(condition.clone(), target, value)?,
            None => Effect::new(target, value)?,
        };
        out.push(effect);
        Ok(())
    }
}

/// Removes unconditional deletes whose target the same action also adds
/// unconditionally. In PDDL the add wins when an effect list holds both.
fn drop_shadowed_deletes(effects: Vec<Effect>) -> Vec<Effect> {
    let is_add = |e: &Effect| !e.is_conditional() && matches!(e.value(), Expr::Bool(true));
    let added: Vec<_> = effects
        .iter()
        .filter(|e| is_add(e))
        .map(|e| e.target().clone())
        .collect();
    effects
        .into_iter()
        .filter(|e| {
            e.is_conditional()
                || !matches!(e.value(), Expr::Bool(false))
                || !added.contains(e.target())
        })
        .collect()
}

fn check_requirements(body: &[SExpr]) -> Result<()> {
    for item in body {
        let requirement = item.expect_atom("a requirement")?;
        if !SUPPORTED_REQUIREMENTS.contains(&requirement) {
            return Err(IoError::parse(
                item.line(),
                format!("unsupported requirement {requirement}"),
            ));
        }
    }
    Ok(())
}

fn split_conjunction(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::And(parts) => parts,
        other => vec![other],
    }
}
