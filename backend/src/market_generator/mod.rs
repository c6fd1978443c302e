pub mod gen;
pub mod seed;
