pub mod arguments;
pub mod symbols;
