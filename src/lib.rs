use std::sync::Once;

pub mod codegen;
pub mod error;
pub mod ir;
pub mod model;
pub mod parser;

pub use codegen::generator::MatrixGenerator;
pub use error::GenError;
pub use ir::analysis::arguments::ArgumentGroup;
pub use ir::ast::{Expr, Matrix, Symbol};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::init();
    });
}
