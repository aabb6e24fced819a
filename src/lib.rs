// binwatch library crate
// Exposes modules for the binary and for integration testing

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod output;
pub mod source;
pub mod utils;
