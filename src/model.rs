//! Model definition files.
//!
//! A definition file is the serialized form of a generator's inputs:
//! the ordered argument groups and the matrices whose elements are
//! expression strings. It exists so the command line tool can drive
//! generation from a file the way the library is driven from code.

use ndarray::Array2;
use serde::Deserialize;
use thiserror::Error;

use crate::error::GenError;
use crate::ir::analysis::arguments::ArgumentGroup;
use crate::ir::ast::{Expr, Matrix};
use crate::parser::{parse_expression, parse_symbol, ParseError};
use crate::MatrixGenerator;

#[derive(Debug, Clone, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixDefinition {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDefinition {
    pub groups: Vec<GroupDefinition>,
    pub matrices: Vec<MatrixDefinition>,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to parse expression at {location}")]
    Expression {
        /// Where in the model the text came from, e.g. `mass_matrix[1][2]`.
        location: String,
        /// The offending expression source, for diagnostics.
        text: String,
        source: ParseError,
    },

    #[error("matrix '{0}' has no rows")]
    EmptyMatrix(String),

    #[error("matrix '{name}' row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        name: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error(transparent)]
    Gen(#[from] GenError),
}

impl ModelDefinition {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse every symbol and element and construct the generator.
    pub fn into_generator(self) -> Result<MatrixGenerator, ModelError> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut symbols = Vec::with_capacity(group.symbols.len());
            for (i, text) in group.symbols.iter().enumerate() {
                let sym = parse_symbol(text).map_err(|source| ModelError::Expression {
                    location: format!("{}[{}]", group.name, i),
                    text: text.clone(),
                    source,
                })?;
                symbols.push(sym);
            }
            groups.push(ArgumentGroup::new(symbols));
        }

        let mut matrices = Vec::with_capacity(self.matrices.len());
        for matrix in &self.matrices {
            matrices.push(parse_matrix(matrix)?);
        }

        Ok(MatrixGenerator::new(matrices, groups)?)
    }
}

fn parse_matrix(def: &MatrixDefinition) -> Result<Matrix, ModelError> {
    let rows = def.rows.len();
    if rows == 0 {
        return Err(ModelError::EmptyMatrix(def.name.clone()));
    }
    let cols = def.rows[0].len();
    if cols == 0 {
        return Err(ModelError::EmptyMatrix(def.name.clone()));
    }

    let mut elements: Vec<Expr> = Vec::with_capacity(rows * cols);
    for (r, row) in def.rows.iter().enumerate() {
        if row.len() != cols {
            return Err(ModelError::RaggedRows {
                name: def.name.clone(),
                row: r,
                found: row.len(),
                expected: cols,
            });
        }
        for (c, text) in row.iter().enumerate() {
            let expr = parse_expression(text).map_err(|source| ModelError::Expression {
                location: format!("{}[{}][{}]", def.name, r, c),
                text: text.clone(),
                source,
            })?;
            elements.push(expr);
        }
    }

    Ok(Array2::from_shape_vec((rows, cols), elements).expect("shape checked above"))
}
