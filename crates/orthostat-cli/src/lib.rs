//! orthostat-cli library root.
//!
//! Re-exports the console modules so that integration tests can drive
//! commands and config handling without a terminal.

pub mod app;
pub mod commands;
pub mod config;
pub mod console;
pub mod driver;
