pub mod browser;
pub mod config;
pub mod hooks;
pub mod http;
