//! Argument classification.
//!
//! The caller partitions every free symbol of the matrix set into
//! ordered argument groups; each group becomes one flat input array of
//! the generated routine. Group order and intra-group order are both
//! caller-significant and preserved verbatim in declarations,
//! documentation, and array indices.

use indexmap::IndexMap;

use crate::error::GenError;
use crate::ir::analysis::symbols::free_symbols;
use crate::ir::ast::{Matrix, Symbol};

/// An ordered, immutable sequence of distinct symbols supplied at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentGroup {
    symbols: Vec<Symbol>,
}

impl ArgumentGroup {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        ArgumentGroup { symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// The comma-joined original textual form of the group's symbols,
    /// keeping any time-dependency decoration.
    pub fn comma_list(&self) -> String {
        let names: Vec<String> = self.symbols.iter().map(|s| s.to_string()).collect();
        names.join(", ")
    }
}

/// Lookup from symbol to (group index, position within group), built
/// once per generation and handed to the printer by reference.
#[derive(Debug, Clone)]
pub struct ArgumentIndex {
    map: IndexMap<Symbol, (usize, usize)>,
}

impl ArgumentIndex {
    /// Build the lookup and verify that every free symbol of the matrix
    /// set belongs to exactly one group.
    pub fn classify(matrices: &[Matrix], groups: &[ArgumentGroup]) -> Result<Self, GenError> {
        let mut map = IndexMap::new();
        for (g, group) in groups.iter().enumerate() {
            for (i, sym) in group.iter().enumerate() {
                if map.insert(sym.clone(), (g, i)).is_some() {
                    return Err(GenError::DuplicateSymbol(sym.to_string()));
                }
            }
        }

        let free = free_symbols(matrices);
        let missing: Vec<String> = free
            .iter()
            .filter(|sym| !map.contains_key(*sym))
            .map(|sym| sym.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GenError::UncoveredSymbols(missing.join(", ")));
        }

        Ok(ArgumentIndex { map })
    }

    pub fn lookup(&self, sym: &Symbol) -> Option<(usize, usize)> {
        self.map.get(sym).copied()
    }
}
