pub mod config;
pub mod quote;
pub mod speech;
