//! Textual expression parsing for model definition files.
//!
//! The grammar covers what matrix elements need: numbers, symbols,
//! `+ - * / ^`, unary minus, parentheses, and function calls. An
//! identifier applied to the single argument `t` (e.g. `x0(t)`) denotes
//! a time-dependent symbol rather than a call, mirroring how dynamical
//! variables are written in the input documentation.

mod pratt;
mod tokens;

use std::ops::Range;

use thiserror::Error;

use crate::ir::ast::{Expr, Symbol};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unrecognized character")]
    UnrecognizedChar { span: Range<usize> },

    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        span: Range<usize>,
    },

    #[error("'{0}' is not a symbol")]
    InvalidSymbol(String),
}

impl ParseError {
    /// Byte span of the offending input, when one is known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::UnrecognizedChar { span } | ParseError::Unexpected { span, .. } => {
                Some(span.clone())
            }
            ParseError::UnexpectedEof | ParseError::InvalidSymbol(_) => None,
        }
    }
}

pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokens::tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEof);
    }
    pratt::parse_tokens(&tokens)
}

/// Parse a group-list entry: a bare name or a time-dependent `name(t)`.
pub fn parse_symbol(input: &str) -> Result<Symbol, ParseError> {
    match parse_expression(input)? {
        Expr::Symbol(sym) => Ok(sym),
        _ => Err(ParseError::InvalidSymbol(input.trim().to_string())),
    }
}
