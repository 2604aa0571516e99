pub mod config;
pub mod overlap;
