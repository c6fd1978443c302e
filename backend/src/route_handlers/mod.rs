pub mod symbols;
pub mod tables;
