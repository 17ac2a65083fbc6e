//! Matrix-set C code generation.
//!
//! `MatrixGenerator` owns the whole pipeline: argument classification,
//! joint CSE, block building, and template assembly. All derived state
//! is computed at construction, so a constructed generator is immutable
//! and a configuration problem is the only error a caller can provoke
//! before `write`. Rendering splices the finished blocks into fixed
//! templates; no file is opened until both texts exist in full.

use indexmap::IndexSet;
use minijinja::{context, Environment};

use crate::codegen::blocks::CodeBlocks;
use crate::codegen::printer::CPrinter;
use crate::error::GenError;
use crate::ir::analysis::arguments::{ArgumentGroup, ArgumentIndex};
use crate::ir::ast::{Matrix, Symbol};
use crate::ir::transform::cse::{self, Subexpression};

/// Base name of generated temporaries: `eom_0`, `eom_1`, ...
pub const TEMP_BASE: &str = "eom_";

const HEADER_TEMPLATE: &str = "void evaluate(
{{ input_args }}
{{ output_args }}
             );
/*

{{ input_docstring }}

*/";

const SOURCE_TEMPLATE: &str = "#include <math.h>
{%- if prefix %}
#include \"{{ prefix }}.h\"
{%- endif %}

void evaluate(
{{ input_args }}
{{ output_args }}
             )
{

{{ subexprs }}

{{ outputs }}

}";

#[derive(Debug)]
pub struct MatrixGenerator {
    matrices: Vec<Matrix>,
    groups: Vec<ArgumentGroup>,
    subexprs: Vec<Subexpression>,
    simplified: Vec<Matrix>,
    blocks: CodeBlocks,
}

impl MatrixGenerator {
    /// Build a generator for `matrices` whose free symbols are
    /// partitioned by `groups`. Fails fast with a configuration error
    /// when the groups do not cover every free symbol; classification,
    /// elimination, and block building all run here, before any I/O.
    pub fn new(matrices: Vec<Matrix>, groups: Vec<ArgumentGroup>) -> Result<Self, GenError> {
        let index = ArgumentIndex::classify(&matrices, &groups)?;
        let (subexprs, simplified) = cse::eliminate(&matrices, TEMP_BASE);

        let temporaries: IndexSet<Symbol> =
            subexprs.iter().map(|sub| sub.symbol.clone()).collect();
        let printer = CPrinter::new(&index, &temporaries);
        let blocks = CodeBlocks::build(&groups, &subexprs, &simplified, &printer)?;

        log::debug!(
            "generator: {} matrices, {} groups, {} temporaries",
            matrices.len(),
            groups.len(),
            subexprs.len()
        );

        Ok(MatrixGenerator {
            matrices,
            groups,
            subexprs,
            simplified,
            blocks,
        })
    }

    pub fn matrices(&self) -> &[Matrix] {
        &self.matrices
    }

    pub fn argument_groups(&self) -> &[ArgumentGroup] {
        &self.groups
    }

    pub fn subexpressions(&self) -> &[Subexpression] {
        &self.subexprs
    }

    pub fn simplified_matrices(&self) -> &[Matrix] {
        &self.simplified
    }

    pub fn code_blocks(&self) -> &CodeBlocks {
        &self.blocks
    }

    /// The comma-joined original textual form of each argument group.
    pub fn comma_lists(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.comma_list()).collect()
    }

    /// Render the header and source text. When `prefix` is given the
    /// source includes `"<prefix>.h"`; otherwise that line is omitted
    /// entirely.
    pub fn render(&self, prefix: Option<&str>) -> Result<(String, String), GenError> {
        let mut env = Environment::new();
        env.add_template("header", HEADER_TEMPLATE)?;
        env.add_template("source", SOURCE_TEMPLATE)?;

        let header = env.get_template("header")?.render(context!(
            input_args => self.blocks.input_args,
            output_args => self.blocks.output_args,
            input_docstring => self.blocks.input_docstring
        ))?;

        let source = env.get_template("source")?.render(context!(
            prefix => prefix,
            input_args => self.blocks.input_args,
            output_args => self.blocks.output_args,
            subexprs => self.blocks.subexprs,
            outputs => self.blocks.outputs
        ))?;

        Ok((header, source))
    }

    /// Render and persist `<prefix>.h` and `<prefix>.c`, overwriting
    /// existing files. Rendering completes before either file is
    /// opened; I/O errors propagate unmodified.
    pub fn write(&self, prefix: &str) -> Result<(), GenError> {
        let (header, source) = self.render(Some(prefix))?;
        std::fs::write(format!("{}.h", prefix), header)?;
        std::fs::write(format!("{}.c", prefix), source)?;
        Ok(())
    }
}
