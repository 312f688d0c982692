//! Command-Line Interface
//!
//! Command implementations invoked from `main.rs`.

pub mod commands;
