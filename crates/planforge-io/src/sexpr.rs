//! S-expression parser for PDDL text, driven by the `pddl.pest` grammar.
//!
//! Atoms are lowercased (PDDL is case-insensitive) and every node remembers
//! the line it starts on for error reporting. `;` starts a comment running to
//! the end of the line.

use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;

use crate::error::{IoError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SExpr {
    Atom { text: String, line: usize },
    List { items: Vec<SExpr>, line: usize },
}

impl SExpr {
    pub(crate) fn line(&self) -> usize {
        match self {
            SExpr::Atom { line, .. } | SExpr::List { line, .. } => *line,
        }
    }

    pub(crate) fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom { text, .. } => Some(text),
            SExpr::List { .. } => None,
        }
    }

    pub(crate) fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List { items, .. } => Some(items),
            SExpr::Atom { .. } => None,
        }
    }

    /// The leading atom of a list, e.g. `and` in `(and a b)`.
    pub(crate) fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// The atom, or a parse error naming what was expected.
    pub(crate) fn expect_atom(&self, what: &str) -> Result<&str> {
        self.as_atom()
            .ok_or_else(|| IoError::parse(self.line(), format!("expected {what}, found a list")))
    }

    pub(crate) fn expect_list(&self, what: &str) -> Result<&[SExpr]> {
        self.as_list().ok_or_else(|| {
            IoError::parse(self.line(), format!("expected {what}, found {}", self))
        })
    }
}

impl std::fmt::Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::Atom { text, .. } => write!(f, "{text}"),
            SExpr::List { items, .. } => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "({})", parts.join(" "))
            }
        }
    }
}

#[derive(pest_derive::Parser)]
#[grammar = "pddl.pest"]
struct PddlGrammar;

/// Parses every top-level form in `source`.
pub(crate) fn parse(source: &str) -> Result<Vec<SExpr>> {
    let mut pairs = PddlGrammar::parse(Rule::file, source).map_err(syntax_error)?;
    let Some(file) = pairs.next() else {
        return Ok(Vec::new());
    };
    Ok(file
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(build)
        .collect())
}

fn build(pair: Pair<'_, Rule>) -> SExpr {
    let line = pair.as_span().start_pos().line_col().0;
    match pair.as_rule() {
        Rule::atom => SExpr::Atom {
            text: pair.as_str().to_lowercase(),
            line,
        },
        _ => SExpr::List {
            items: pair.into_inner().map(build).collect(),
            line,
        },
    }
}

fn syntax_error(err: pest::error::Error<Rule>) -> IoError {
    let line = match err.line_col {
        LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
    };
    IoError::parse(line, err.variant.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lists_with_lines() {
        let forms = parse("(define\n  (domain Robot) ; comment (ignored\n  (:types a))").unwrap();
        assert_eq!(forms.len(), 1);
        let items = forms[0].as_list().unwrap();
        assert_eq!(items[0].as_atom(), Some("define"));
        assert_eq!(items[1].head(), Some("domain"));
        assert_eq!(items[1].to_string(), "(domain robot)");
        assert_eq!(items[2].line(), 3);
    }

    #[test]
    fn test_unbalanced_input() {
        assert!(matches!(
            parse("(a (b)"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse("a)\n)"),
            Err(IoError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse("(define\n  (domain d)\n  (:types a)))").unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("  ; nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn test_atoms_stop_at_parens() {
        let forms = parse("(>= (f ?x)10.5)").unwrap();
        assert_eq!(forms[0].to_string(), "(>= (f ?x) 10.5)");
    }
}
