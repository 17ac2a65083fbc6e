//! Joint common-subexpression elimination across a matrix set.
//!
//! The pass runs in two sweeps over a fixed traversal order (matrices in
//! caller order, elements row-major, children left to right):
//!
//! 1. A counting sweep tallies every non-atomic subtree. Descent stops
//!    at a subtree that has already been seen, so a term repeated only
//!    inside a larger repeated term is not tallied separately.
//! 2. A post-order rewrite sweep replaces each subtree seen more than
//!    once with a temporary symbol, emitting its definition the first
//!    time it is reached.
//!
//! Because definitions are emitted in post-order of first use, the
//! resulting list is a valid evaluation order by construction: no
//! definition can reference a temporary introduced later. Temporary
//! numbering is zero-based and shared across the whole matrix set, and
//! the whole pass is deterministic for identical input.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ir::ast::{Expr, Matrix, Symbol};

/// A temporary symbol together with its defining expression. The
/// expression is built only from input symbols and temporaries defined
/// earlier in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subexpression {
    pub symbol: Symbol,
    pub expr: Expr,
}

/// Eliminate repeated subtrees across `matrices`, naming temporaries
/// `<base>0`, `<base>1`, ... Returns the ordered definition list and
/// one rewritten matrix per input matrix.
pub fn eliminate(matrices: &[Matrix], base: &str) -> (Vec<Subexpression>, Vec<Matrix>) {
    let mut counts = IndexMap::new();
    for matrix in matrices {
        for element in matrix.iter() {
            count(element, &mut counts);
        }
    }

    let mut rewriter = Rewriter {
        counts: &counts,
        bound: IndexMap::new(),
        subexprs: Vec::new(),
        base,
    };

    let mut simplified = Vec::with_capacity(matrices.len());
    for matrix in matrices {
        let (rows, cols) = matrix.dim();
        let mut elements = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                elements.push(rewriter.rewrite(&matrix[[row, col]]));
            }
        }
        simplified
            .push(Matrix::from_shape_vec((rows, cols), elements).expect("shape is preserved"));
    }

    log::debug!(
        "cse: {} temporaries across {} matrices",
        rewriter.subexprs.len(),
        matrices.len()
    );

    (rewriter.subexprs, simplified)
}

fn count(expr: &Expr, counts: &mut IndexMap<Expr, usize>) {
    if expr.is_atom() {
        return;
    }
    let seen = counts.entry(expr.clone()).or_insert(0);
    *seen += 1;
    if *seen > 1 {
        // Subtrees below were already tallied on the first encounter.
        return;
    }
    match expr {
        Expr::Add(lhs, rhs)
        | Expr::Sub(lhs, rhs)
        | Expr::Mul(lhs, rhs)
        | Expr::Div(lhs, rhs)
        | Expr::Pow(lhs, rhs) => {
            count(lhs, counts);
            count(rhs, counts);
        }
        Expr::Neg(inner) => count(inner, counts),
        Expr::Call { args, .. } => {
            for arg in args {
                count(arg, counts);
            }
        }
        Expr::Integer(_) | Expr::Float(_) | Expr::Symbol(_) => unreachable!(),
    }
}

struct Rewriter<'a> {
    counts: &'a IndexMap<Expr, usize>,
    bound: IndexMap<Expr, Symbol>,
    subexprs: Vec<Subexpression>,
    base: &'a str,
}

impl Rewriter<'_> {
    fn rewrite(&mut self, expr: &Expr) -> Expr {
        if expr.is_atom() {
            return expr.clone();
        }
        if let Some(sym) = self.bound.get(expr) {
            return Expr::Symbol(sym.clone());
        }

        let rebuilt = match expr {
            Expr::Add(lhs, rhs) => Expr::Add(self.arc(lhs), self.arc(rhs)),
            Expr::Sub(lhs, rhs) => Expr::Sub(self.arc(lhs), self.arc(rhs)),
            Expr::Mul(lhs, rhs) => Expr::Mul(self.arc(lhs), self.arc(rhs)),
            Expr::Div(lhs, rhs) => Expr::Div(self.arc(lhs), self.arc(rhs)),
            Expr::Pow(lhs, rhs) => Expr::Pow(self.arc(lhs), self.arc(rhs)),
            Expr::Neg(inner) => Expr::Neg(self.arc(inner)),
            Expr::Call { name, args } => Expr::Call {
                name: name.clone(),
                args: args.iter().map(|arg| self.rewrite(arg)).collect(),
            },
            Expr::Integer(_) | Expr::Float(_) | Expr::Symbol(_) => unreachable!(),
        };

        if self.counts.get(expr).copied().unwrap_or(0) > 1 {
            let sym = Symbol::new(format!("{}{}", self.base, self.subexprs.len()));
            self.bound.insert(expr.clone(), sym.clone());
            self.subexprs.push(Subexpression {
                symbol: sym.clone(),
                expr: rebuilt,
            });
            Expr::Symbol(sym)
        } else {
            rebuilt
        }
    }

    fn arc(&mut self, expr: &Expr) -> Arc<Expr> {
        Arc::new(self.rewrite(expr))
    }
}
