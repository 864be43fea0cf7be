//! Source-tree acquisition
//!
//! Turns a repository reference into a directory on disk. Local directories
//! are used in place; anything else is shallow-cloned with `git` into a
//! temporary directory that lives as long as the returned [`FetchedSource`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::types::{CraftError, Result};

/// A materialized source tree
#[derive(Debug)]
pub struct FetchedSource {
    reference: String,
    path: PathBuf,
    // Removed on drop
    checkout: Option<TempDir>,
}

impl FetchedSource {
    pub fn local(reference: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            path: path.into(),
            checkout: None,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the tree is a temporary checkout
    pub fn is_temporary(&self) -> bool {
        self.checkout.is_some()
    }
}

/// Acquisition collaborator used by the analyzer agent
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<FetchedSource>;
}

/// Local directories in place, everything else via `git clone --depth 1`
#[derive(Debug, Clone)]
pub struct GitFetcher {
    git: PathBuf,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
        }
    }
}

impl GitFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_binary(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(&self, reference: &str) -> Result<FetchedSource> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CraftError::fetch(reference, "empty repository reference"));
        }

        let local = Path::new(reference);
        if local.is_dir() {
            debug!("Using local source tree: {}", local.display());
            return Ok(FetchedSource::local(reference, local));
        }

        let checkout = TempDir::new()
            .map_err(|e| CraftError::fetch(reference, format!("temporary directory: {}", e)))?;

        info!("Cloning {}", reference);

        let output = Command::new(&self.git)
            .args(["clone", "--depth", "1", "--quiet", "--"])
            .arg(reference)
            .arg(checkout.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| {
                CraftError::fetch(
                    reference,
                    format!("failed to run {}: {}", self.git.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CraftError::fetch(
                reference,
                format!("git clone exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(FetchedSource {
            reference: reference.to_string(),
            path: checkout.path().to_path_buf(),
            checkout: Some(checkout),
        })
    }
}
