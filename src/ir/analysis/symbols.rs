//! Free-symbol collection over expressions and matrix sets.
//!
//! Collection order is deterministic: matrices in caller order, elements
//! row-major, and a left-to-right walk within each expression. Later
//! stages rely on this for reproducible validation messages.

use indexmap::IndexSet;

use crate::ir::ast::{Expr, Matrix, Symbol};

/// Collect the free symbols of a single expression, in first-occurrence
/// order.
pub fn expr_symbols(expr: &Expr, out: &mut IndexSet<Symbol>) {
    match expr {
        Expr::Integer(_) | Expr::Float(_) => {}
        Expr::Symbol(sym) => {
            out.insert(sym.clone());
        }
        Expr::Add(lhs, rhs)
        | Expr::Sub(lhs, rhs)
        | Expr::Mul(lhs, rhs)
        | Expr::Div(lhs, rhs)
        | Expr::Pow(lhs, rhs) => {
            expr_symbols(lhs, out);
            expr_symbols(rhs, out);
        }
        Expr::Neg(inner) => expr_symbols(inner, out),
        Expr::Call { args, .. } => {
            for arg in args {
                expr_symbols(arg, out);
            }
        }
    }
}

/// Collect the free symbols across a whole matrix set.
pub fn free_symbols(matrices: &[Matrix]) -> IndexSet<Symbol> {
    let mut out = IndexSet::new();
    for matrix in matrices {
        for element in matrix.iter() {
            expr_symbols(element, &mut out);
        }
    }
    out
}
