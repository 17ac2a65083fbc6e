pub mod blocks;
pub mod generator;
pub mod printer;
