//! Negation normal form.

use super::Expr;

impl Expr {
    /// Pushes negations down to atoms.
    ///
    /// After the transform `Not` only wraps fluent applications, comparisons
    /// and equalities. `Implies` is expanded into a disjunction. Atoms and
    /// everything below them are left untouched.
    pub fn to_nnf(&self) -> Expr {
        nnf(self, false)
    }
}

fn nnf(expr: &Expr, negated: bool) -> Expr {
    match expr {
        Expr::And(xs) if negated => Expr::Or(xs.iter().map(|x| nnf(x, true)).collect()),
        Expr::And(xs) => Expr::And(xs.iter().map(|x| nnf(x, false)).collect()),
        Expr::Or(xs) if negated => Expr::And(xs.iter().map(|x| nnf(x, true)).collect()),
        Expr::Or(xs) => Expr::Or(xs.iter().map(|x| nnf(x, false)).collect()),
        Expr::Not(x) => nnf(x, !negated),
        Expr::Implies(l, r) if negated => Expr::And(vec![nnf(l, false), nnf(r, true)]),
        Expr::Implies(l, r) => Expr::Or(vec![nnf(l, true), nnf(r, false)]),
        Expr::Bool(b) => Expr::Bool(*b != negated),
        atom if negated => Expr::Not(Box::new(atom.clone())),
        atom => atom.clone(),
    }
}
