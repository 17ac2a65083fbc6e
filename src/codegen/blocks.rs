//! Text blocks assembled into the emitted header and source.
//!
//! All wrapping goes through one greedy fill over pre-split chunks, so
//! the two break rules stay consistent: comma lists break only after a
//! comma, statements break only at additive operators (the only points
//! where the printer emits spaces), and the operator always stays at
//! the end of the broken line.

use crate::codegen::printer::CPrinter;
use crate::error::GenError;
use crate::ir::analysis::arguments::ArgumentGroup;
use crate::ir::ast::Matrix;
use crate::ir::transform::cse::Subexpression;

/// Column after which a line wraps.
pub const WRAP_WIDTH: usize = 79;

/// Indent of parameter declaration lines, aligning them under the open
/// parenthesis of `void evaluate(`.
const PARAM_INDENT: &str = "              ";

/// One indent unit, used for statements and their continuations.
const STMT_INDENT: &str = "    ";

/// The five text fragments the emitter splices into its templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlocks {
    pub input_args: String,
    pub output_args: String,
    pub input_docstring: String,
    pub subexprs: String,
    pub outputs: String,
}

impl CodeBlocks {
    pub fn build(
        groups: &[ArgumentGroup],
        subexprs: &[Subexpression],
        simplified: &[Matrix],
        printer: &CPrinter<'_>,
    ) -> Result<CodeBlocks, GenError> {
        Ok(CodeBlocks {
            input_args: input_args(groups),
            output_args: output_args(simplified),
            input_docstring: input_docstring(groups),
            subexprs: subexpr_statements(subexprs, printer)?,
            outputs: output_statements(simplified, printer)?,
        })
    }
}

/// One declaration line per argument group, every line comma-terminated
/// (the output parameters always follow).
fn input_args(groups: &[ArgumentGroup]) -> String {
    let lines: Vec<String> = groups
        .iter()
        .enumerate()
        .map(|(g, group)| format!("{}double input_{}[{}],", PARAM_INDENT, g, group.len()))
        .collect();
    lines.join("\n")
}

/// One declaration line per matrix, sized to the flattened element
/// count, comma on all but the last.
fn output_args(simplified: &[Matrix]) -> String {
    let last = simplified.len().saturating_sub(1);
    let lines: Vec<String> = simplified
        .iter()
        .enumerate()
        .map(|(m, matrix)| {
            let comma = if m == last { "" } else { "," };
            format!("{}double output_{}[{}]{}", PARAM_INDENT, m, matrix.len(), comma)
        })
        .collect();
    lines.join("\n")
}

/// `input_<g>[<size>] : [<symbols>]` per group, in the symbols' original
/// textual form, wrapped with continuation lines flush-left.
fn input_docstring(groups: &[ArgumentGroup]) -> String {
    let mut blocks = Vec::with_capacity(groups.len());
    for (g, group) in groups.iter().enumerate() {
        let header = format!("input_{}[{}] : [", g, group.len());
        let names: Vec<String> = group.iter().map(|sym| sym.to_string()).collect();
        if names.is_empty() {
            blocks.push(format!("{}]", header));
            continue;
        }
        let last = names.len() - 1;
        let mut chunks: Vec<String> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if i == last {
                    format!("{}]", name)
                } else {
                    format!("{},", name)
                }
            })
            .collect();
        chunks[0] = format!("{}{}", header, chunks[0]);
        blocks.push(fill(&chunks, WRAP_WIDTH, ""));
    }
    blocks.join("\n")
}

/// `double <temp> = <expr>;` per subexpression, in evaluation order.
fn subexpr_statements(
    subexprs: &[Subexpression],
    printer: &CPrinter<'_>,
) -> Result<String, GenError> {
    let mut lines = Vec::with_capacity(subexprs.len());
    for sub in subexprs {
        let prefix = format!("{}double {} = ", STMT_INDENT, sub.symbol.name);
        let rhs = printer.print(&sub.expr)?;
        lines.push(wrap_statement(&prefix, &rhs));
    }
    Ok(lines.join("\n"))
}

/// `output_<m>[<k>] = <expr>;` per flattened element, row-major, with a
/// blank line between matrices.
fn output_statements(simplified: &[Matrix], printer: &CPrinter<'_>) -> Result<String, GenError> {
    let mut blocks = Vec::with_capacity(simplified.len());
    for (m, matrix) in simplified.iter().enumerate() {
        let mut lines = Vec::with_capacity(matrix.len());
        for (k, element) in matrix.iter().enumerate() {
            let prefix = format!("{}output_{}[{}] = ", STMT_INDENT, m, k);
            let rhs = printer.print(element)?;
            lines.push(wrap_statement(&prefix, &rhs));
        }
        blocks.push(lines.join("\n"));
    }
    Ok(blocks.join("\n\n"))
}

/// Wrap one assignment statement. The prefix lands on the first line;
/// continuations get one indent unit.
fn wrap_statement(prefix: &str, rhs: &str) -> String {
    let mut chunks = additive_chunks(rhs);
    if let Some(last) = chunks.last_mut() {
        last.push(';');
    }
    chunks[0] = format!("{}{}", prefix, chunks[0]);
    fill(&chunks, WRAP_WIDTH, STMT_INDENT)
}

/// Split printed expression text into chunks that may not be divided
/// further: each chunk is a term together with its trailing additive
/// operator, so a break always leaves the operator at the end of a line.
fn additive_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for token in text.split(' ') {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(token);
        if token == "+" || token == "-" {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Greedy fill: chunks are joined with single spaces until the next one
/// would pass `width`, then a new line starts with `indent`.
fn fill(chunks: &[String], width: usize, indent: &str) -> String {
    let mut lines = Vec::new();
    let mut line = chunks[0].clone();
    for chunk in &chunks[1..] {
        if line.len() + 1 + chunk.len() <= width {
            line.push(' ');
            line.push_str(chunk);
        } else {
            lines.push(std::mem::take(&mut line));
            line = format!("{}{}", indent, chunk);
        }
    }
    lines.push(line);
    lines.join("\n")
}
