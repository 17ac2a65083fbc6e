//! C expression printing.
//!
//! Two symbol universes exist at print time: input symbols render as
//! indexed accesses `input_<g>[<i>]` using the classifier's lookup, and
//! temporaries render as their local variable name. Anything else is an
//! internal invariant violation, not a user error.
//!
//! Formatting rules the rest of the pipeline depends on: `*` and `/`
//! print without surrounding spaces while ` + ` and ` - ` are spaced,
//! so line wrapping can treat whitespace as "safe to break here".

use indexmap::IndexSet;

use crate::error::GenError;
use crate::ir::analysis::arguments::ArgumentIndex;
use crate::ir::ast::{Expr, Symbol};

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

pub struct CPrinter<'a> {
    index: &'a ArgumentIndex,
    temporaries: &'a IndexSet<Symbol>,
}

impl<'a> CPrinter<'a> {
    pub fn new(index: &'a ArgumentIndex, temporaries: &'a IndexSet<Symbol>) -> Self {
        CPrinter { index, temporaries }
    }

    /// Print a full expression as compilable C text.
    pub fn print(&self, expr: &Expr) -> Result<String, GenError> {
        Ok(self.render(expr)?.0)
    }

    pub fn print_symbol(&self, sym: &Symbol) -> Result<String, GenError> {
        if self.temporaries.contains(sym) {
            return Ok(sym.name.clone());
        }
        match self.index.lookup(sym) {
            Some((group, position)) => Ok(format!("input_{}[{}]", group, position)),
            None => Err(GenError::UnknownSymbol(sym.to_string())),
        }
    }

    /// Render a child, parenthesizing when its binding strength is below
    /// the context's requirement.
    fn child(&self, expr: &Expr, min: u8) -> Result<String, GenError> {
        let (text, prec) = self.render(expr)?;
        if prec < min {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    /// Returns the rendered text together with the binding strength of
    /// the rendering (an expanded power prints as a product, so its
    /// strength is that of `*`, not of the original node).
    fn render(&self, expr: &Expr) -> Result<(String, u8), GenError> {
        match expr {
            Expr::Integer(value) => {
                let prec = if *value < 0 { PREC_ADD } else { PREC_ATOM };
                Ok((value.to_string(), prec))
            }
            Expr::Float(value) => {
                let prec = if value.0 < 0.0 { PREC_ADD } else { PREC_ATOM };
                Ok((format_float(value.0), prec))
            }
            Expr::Symbol(sym) => Ok((self.print_symbol(sym)?, PREC_ATOM)),
            Expr::Add(lhs, rhs) => {
                let left = self.child(lhs, PREC_ADD)?;
                if let Expr::Neg(inner) = rhs.as_ref() {
                    let right = self.child(inner, PREC_MUL)?;
                    return Ok((format!("{} - {}", left, right), PREC_ADD));
                }
                let right = self.child(rhs, PREC_ADD)?;
                // A rendered term can carry its own sign, e.g. a leading
                // negated product; fold it into the operator.
                if let Some(stripped) = right.strip_prefix('-') {
                    Ok((format!("{} - {}", left, stripped), PREC_ADD))
                } else {
                    Ok((format!("{} + {}", left, right), PREC_ADD))
                }
            }
            Expr::Sub(lhs, rhs) => {
                let left = self.child(lhs, PREC_ADD)?;
                if let Expr::Neg(inner) = rhs.as_ref() {
                    let right = self.child(inner, PREC_ADD)?;
                    return Ok((format!("{} + {}", left, right), PREC_ADD));
                }
                let right = self.child(rhs, PREC_MUL)?;
                Ok((format!("{} - {}", left, right), PREC_ADD))
            }
            Expr::Mul(lhs, rhs) => {
                let left = self.child(lhs, PREC_MUL)?;
                let right = self.child(rhs, PREC_POW)?;
                Ok((format!("{}*{}", left, right), PREC_MUL))
            }
            Expr::Div(lhs, rhs) => {
                // int/int would truncate in C.
                if let (Expr::Integer(num), Expr::Integer(den)) = (lhs.as_ref(), rhs.as_ref()) {
                    return Ok((format!("{}.0/{}.0", num, den), PREC_MUL));
                }
                let left = self.child(lhs, PREC_MUL)?;
                let right = self.child(rhs, PREC_POW)?;
                Ok((format!("{}/{}", left, right), PREC_MUL))
            }
            Expr::Pow(base, exponent) => self.render_pow(base, exponent),
            Expr::Neg(inner) => {
                let text = self.child(inner, PREC_MUL)?;
                Ok((format!("-{}", text), PREC_ADD))
            }
            Expr::Call { name, args } => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.child(arg, 0)?);
                }
                Ok((
                    format!("{}({})", map_function(name), parts.join(", ")),
                    PREC_ATOM,
                ))
            }
        }
    }

    fn render_pow(&self, base: &Expr, exponent: &Expr) -> Result<(String, u8), GenError> {
        match exponent {
            Expr::Integer(0) => Ok(("1".to_string(), PREC_ATOM)),
            Expr::Integer(1) => self.render(base),
            // Small integer powers unroll into products; the repeated
            // factor contains no spaces, so it never wraps mid-term.
            Expr::Integer(n) if (2..=4).contains(n) => {
                let factor = self.child(base, PREC_POW)?;
                let product = vec![factor; *n as usize].join("*");
                Ok((product, PREC_MUL))
            }
            Expr::Integer(n) if (-4..0).contains(n) => {
                let factor = self.child(base, PREC_POW)?;
                let magnitude = (-n) as usize;
                let inner = if magnitude == 1 {
                    factor
                } else {
                    format!("({})", vec![factor; magnitude].join("*"))
                };
                Ok((format!("1.0/{}", inner), PREC_MUL))
            }
            Expr::Float(f) if f.0 == 0.5 => {
                let inner = self.child(base, 0)?;
                Ok((format!("sqrt({})", inner), PREC_ATOM))
            }
            Expr::Float(f) if f.0 == -0.5 => {
                let inner = self.child(base, 0)?;
                Ok((format!("1.0/sqrt({})", inner), PREC_MUL))
            }
            _ => {
                let base_text = self.child(base, 0)?;
                let exp_text = self.child(exponent, 0)?;
                Ok((format!("pow({}, {})", base_text, exp_text), PREC_ATOM))
            }
        }
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn map_function(name: &str) -> &str {
    match name {
        "abs" => "fabs",
        other => other,
    }
}
