//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/readmecraft/config.toml)
//! 3. Project config (.readmecraft/config.toml)
//! 4. Environment variables (READMECRAFT_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, PROJECT_DIR};
pub use types::*;
