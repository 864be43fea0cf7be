//! Config Command
//!
//! Manage readmecraft configuration.
//!
//! Usage:
//!   readmecraft config show [-f text|json|yaml]
//!   readmecraft config path
//!   readmecraft config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    let rendered = ConfigLoader::render_config(&config, format)?;
    if format == "text" {
        println!("# Effective configuration (defaults → global → project → env)\n");
    }
    println!("{}", rendered);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Directory: {}", dir.display());
    if let Some(config_path) = ConfigLoader::global_config_path() {
        println!("  Config:    {}", config_path.display());
    }
    Ok(())
}

/// Initialize project configuration
pub fn init_project(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_project(force)?;
    println!("✓ Initialized project configuration");
    println!("  Directory: {}", dir.display());
    println!(
        "  Config:    {}",
        ConfigLoader::project_config_path().display()
    );
    Ok(())
}
