//! CLI Commands

pub mod analyze;
