//! Human-readable rendering of symbols and expressions.
//!
//! This is the *original* textual form used in documentation comments
//! and verbose output: time-dependent symbols keep their `(t)`
//! decoration and powers print with `^`. Generated C text comes from
//! the code printer instead.

use std::fmt;

use crate::ir::ast::{Expr, Symbol};

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time_dependent {
            write!(f, "{}(t)", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Binding strength used to decide parenthesization.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) | Expr::Neg(..) => 1,
        Expr::Mul(..) | Expr::Div(..) => 2,
        Expr::Pow(..) => 3,
        Expr::Integer(_) | Expr::Float(_) | Expr::Symbol(_) | Expr::Call { .. } => 4,
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &Expr, min: u8) -> fmt::Result {
    if precedence(child) < min {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(f, "{}", value),
            Expr::Float(value) => {
                if value.0.fract() == 0.0 && value.0.is_finite() {
                    write!(f, "{:.1}", value.0)
                } else {
                    write!(f, "{}", value.0)
                }
            }
            Expr::Symbol(sym) => write!(f, "{}", sym),
            Expr::Add(lhs, rhs) => {
                write!(f, "{}", lhs)?;
                // Fold an explicitly negated term into the operator.
                if let Expr::Neg(inner) = rhs.as_ref() {
                    write!(f, " - ")?;
                    write_child(f, inner, 2)
                } else {
                    write!(f, " + ")?;
                    write!(f, "{}", rhs)
                }
            }
            Expr::Sub(lhs, rhs) => {
                write!(f, "{} - ", lhs)?;
                write_child(f, rhs, 2)
            }
            Expr::Mul(lhs, rhs) => {
                write_child(f, lhs, 2)?;
                write!(f, "*")?;
                write_child(f, rhs, 2)
            }
            Expr::Div(lhs, rhs) => {
                write_child(f, lhs, 2)?;
                write!(f, "/")?;
                write_child(f, rhs, 3)
            }
            Expr::Pow(base, exponent) => {
                write_child(f, base, 4)?;
                write!(f, "^")?;
                write_child(f, exponent, 4)
            }
            Expr::Neg(inner) => {
                write!(f, "-")?;
                write_child(f, inner, 2)
            }
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
