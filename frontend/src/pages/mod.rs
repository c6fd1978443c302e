pub mod home;
pub mod market;
pub mod symbols;
