//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/bidsift/config.toml)
//! 3. Project config (./bidsift.toml) or explicit `--config` file
//! 4. Environment variables (BIDSIFT_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
