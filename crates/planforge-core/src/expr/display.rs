//! Human-readable rendering of expressions.

use std::fmt;

use super::{Expr, FluentExp};

impl fmt::Display for FluentExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fluent().name())?;
        if !self.args().is_empty() {
            let args: Vec<String> = self.args().iter().map(|a| a.to_string()).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, xs: &[Expr], op: &str) -> fmt::Result {
            let parts: Vec<String> = xs.iter().map(|x| x.to_string()).collect();
            write!(f, "({})", parts.join(&format!(" {op} ")))
        }

        match self {
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Int(i) => write!(f, "{i}"),
            Expr::Real(r) => write!(f, "{}", r.0),
            Expr::Object(o) => write!(f, "{o}"),
            Expr::Param(p) => write!(f, "{}", p.name()),
            Expr::Fluent(fe) => write!(f, "{fe}"),
            Expr::And(xs) => join(f, xs, "and"),
            Expr::Or(xs) => join(f, xs, "or"),
            Expr::Not(x) => write!(f, "(not {x})"),
            Expr::Implies(l, r) => write!(f, "({l} implies {r})"),
            Expr::Eq(l, r) => write!(f, "({l} == {r})"),
            Expr::Lt(l, r) => write!(f, "({l} < {r})"),
            Expr::Le(l, r) => write!(f, "({l} <= {r})"),
            Expr::Gt(l, r) => write!(f, "({l} > {r})"),
            Expr::Ge(l, r) => write!(f, "({l} >= {r})"),
            Expr::Plus(l, r) => write!(f, "({l} + {r})"),
            Expr::Minus(l, r) => write!(f, "({l} - {r})"),
            Expr::Times(l, r) => write!(f, "({l} * {r})"),
            Expr::Div(l, r) => write!(f, "({l} / {r})"),
        }
    }
}
