//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/readmecraft/config.toml)
//! 3. Project config (.readmecraft/config.toml)
//! 4. Environment variables (READMECRAFT_* prefix, `__` between nesting levels)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{CraftError, Result};

/// Project data directory name
pub const PROJECT_DIR: &str = ".readmecraft";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "READMECRAFT_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env_layer());

        let config: Config = figment
            .extract()
            .map_err(|e| CraftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Environment provider: READMECRAFT_LLM__TIMEOUT_SECS -> llm.timeout_secs
    fn env_layer() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| CraftError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (~/.config/readmecraft/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("readmecraft"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Where the CLI keeps the envelope history between invocations
    pub fn session_path() -> PathBuf {
        Self::project_dir().join("session.json")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());

        let session = Self::session_path();
        let exists = if session.exists() { "✓" } else { "✗" };
        println!("  Session: {} {}", exists, session.display());
    }

    /// Render the effective configuration as text, json or yaml
    pub fn render_config(config: &Config, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(config)?),
            "yaml" => serde_yaml::to_string(config).map_err(|e| CraftError::Config(e.to_string())),
            _ => toml::to_string_pretty(config).map_err(|e| CraftError::Config(e.to_string())),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            CraftError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = Self::project_config_path();
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_global_config() -> String {
        r#"# readmecraft Global Configuration
# User-wide defaults. Project settings in .readmecraft/config.toml override these.

version = "1.0"

# Generation backend: gemini (GOOGLE_API_KEY), openai (OPENAI_API_KEY), ollama
[llm]
provider = "gemini"
model = "gemini-2.0-flash"
vision_model = "gemini-2.5-flash"
timeout_secs = 300
"#
        .to_string()
    }

    fn default_project_config() -> String {
        r#"# readmecraft Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[writer]
template = "basic"
sections = ["installation", "usage", "contributing", "license"]

[export]
dir = "exports"
filename = "README.md"
keep_versions = false

[publish]
branch = "main"
path = "README.md"
commit_message = "docs: update README"
"#
        .to_string()
    }
}
