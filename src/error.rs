//! Error types for the generation pipeline.
//!
//! Configuration errors are the only failures a caller can provoke with
//! bad input, and they are raised at construction time before any CSE or
//! printing work begins. `UnknownSymbol` signals a broken internal
//! invariant: a symbol reached the printer without a group index or a
//! temporary binding.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("free symbols not covered by any argument group: [{0}]")]
    UncoveredSymbols(String),

    #[error("symbol '{0}' appears in more than one argument group")]
    DuplicateSymbol(String),

    #[error("symbol '{0}' has no argument index or temporary binding")]
    UnknownSymbol(String),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
