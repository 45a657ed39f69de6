//! A small S-expression reader.
//!
//! Parse trees, probability tables and lexicons all use the same
//! parenthesized syntax, so they share this one reader.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};

/// Either a bare token or a parenthesized list of expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(text) => Some(text),
            Sexp::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::Atom(_) => None,
            Sexp::List(items) => Some(items),
        }
    }
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn atom(input: &str) -> IResult<&str, Sexp> {
    map(take_while1(is_atom_char), |text: &str| {
        Sexp::Atom(text.to_string())
    })(input)
}

fn list(input: &str) -> IResult<&str, Sexp> {
    map(
        delimited(
            char('('),
            many0(preceded(multispace0, expression)),
            preceded(multispace0, char(')')),
        ),
        Sexp::List,
    )(input)
}

fn expression(input: &str) -> IResult<&str, Sexp> {
    alt((list, atom))(input)
}

/// Read every top-level expression in `input`.
///
/// The whole input must be consumed. On failure the message quotes the
/// text where reading stopped.
pub fn parse_all(input: &str) -> Result<Vec<Sexp>, String> {
    let mut document = all_consuming(terminated(
        many0(preceded(multispace0, expression)),
        multispace0,
    ));

    match document(input) {
        Ok((_, expressions)) => Ok(expressions),
        Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => {
            Err(format!("unexpected input near {:?}", excerpt(error.input)))
        }
        Err(nom::Err::Incomplete(_)) => Err("incomplete input".to_string()),
    }
}

/// Read exactly one expression.
pub fn parse_one(input: &str) -> Result<Sexp, String> {
    let mut expressions = parse_all(input)?;
    match expressions.len() {
        1 => Ok(expressions.remove(0)),
        0 => Err("no expression found".to_string()),
        n => Err(format!("expected one expression, found {n}")),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(24).collect()
}
