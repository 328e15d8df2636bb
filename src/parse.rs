use std::str::FromStr;

use symbolic_expressions::{parser::parse_str, Sexp, SexpError};
use thiserror::Error;

use crate::{Pattern, Symbol, Term, Var};

/// An error while parsing a [`Term`] or a [`Pattern`] from an
/// s-expression.
///
/// Lexical errors (an unexpected `)`, an unterminated list, trailing
/// input, empty input) come from the underlying s-expression parser as
/// [`BadSexp`](ParseError::BadSexp); the other variants enforce this
/// crate's grammar on top of it.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input was not a well-formed s-expression.
    #[error("invalid s-expression: {0}")]
    BadSexp(SexpError),
    /// Empty lists `()` denote nothing and are rejected.
    #[error("found empty s-expression")]
    EmptySexp,
    /// A list cannot head an application; operators are atoms.
    #[error("found a list in the head position: {0}")]
    HeadList(Sexp),
    /// Operators cannot be variables.
    #[error("found a variable {0} in the head position")]
    HeadVar(String),
    /// An atom starting with `?` that is not a well-formed variable.
    #[error("bad variable: {0}")]
    BadVar(String),
    /// A variable in what must be a ground term.
    #[error("found variable {0} in a ground term")]
    UnexpectedVar(String),
}

pub(crate) fn parse_pattern(s: &str) -> Result<Pattern, ParseError> {
    let sexp = parse_str(s.trim()).map_err(ParseError::BadSexp)?;
    sexp_to_pattern(&sexp)
}

pub(crate) fn parse_term(s: &str) -> Result<Term, ParseError> {
    pattern_to_term(parse_pattern(s)?)
}

fn sexp_to_pattern(sexp: &Sexp) -> Result<Pattern, ParseError> {
    match sexp {
        Sexp::Empty => Err(ParseError::EmptySexp),
        Sexp::String(s) => {
            if s.starts_with('?') {
                let var = s.parse::<Var>().map_err(ParseError::BadVar)?;
                Ok(Pattern::Var(var))
            } else {
                Ok(Pattern::Node(Symbol::from(s.as_str()), vec![]))
            }
        }
        Sexp::List(list) => match list.as_slice() {
            [] => Err(ParseError::EmptySexp),
            [head, tail @ ..] => {
                let op = match head {
                    Sexp::String(s) if s.starts_with('?') => {
                        return Err(ParseError::HeadVar(s.clone()))
                    }
                    Sexp::String(s) => Symbol::from(s.as_str()),
                    _ => return Err(ParseError::HeadList(head.clone())),
                };
                let children = tail
                    .iter()
                    .map(sexp_to_pattern)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Pattern::Node(op, children))
            }
        },
    }
}

fn pattern_to_term(pattern: Pattern) -> Result<Term, ParseError> {
    match pattern {
        Pattern::Var(v) => Err(ParseError::UnexpectedVar(v.to_string())),
        Pattern::Node(op, args) => {
            let children = args
                .into_iter()
                .map(pattern_to_term)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::new(op, children))
        }
    }
}

impl FromStr for Term {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_term(s)
    }
}
