//! Export Agent
//!
//! Writes the final document to `<dir>/<filename>` and then runs the
//! post-export hooks. A failing hook is logged and never changes the result.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::check_kind;
use crate::config::ExportConfig;
use crate::constants::agents::{CALLER, EXPORTER};
use crate::constants::export::VERSIONS_DIR;
use crate::types::{Message, MessageKind, Result};

// =============================================================================
// Hooks
// =============================================================================

/// Action run after a successful export
pub trait ExportHook: Send + Sync {
    fn name(&self) -> &str;

    fn after_export(&self, path: &Path, content: &str) -> Result<()>;
}

/// Emits a structured tracing event for every export
#[derive(Debug, Default)]
pub struct ExportLogHook;

impl ExportHook for ExportLogHook {
    fn name(&self) -> &str {
        "export-log"
    }

    fn after_export(&self, path: &Path, content: &str) -> Result<()> {
        info!(
            path = %path.display(),
            bytes = content.len(),
            lines = content.lines().count(),
            "README exported"
        );
        Ok(())
    }
}

/// Keeps timestamped copies under `<dir>/versions/`, skipping unchanged content
#[derive(Debug)]
pub struct VersionSnapshotHook {
    versions_dir: PathBuf,
}

impl VersionSnapshotHook {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            versions_dir: export_dir.join(VERSIONS_DIR),
        }
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Most recent snapshot; names sort chronologically
    fn latest_snapshot(&self) -> Option<PathBuf> {
        fs::read_dir(&self.versions_dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .max()
    }

    fn snapshot_name(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "README".to_string());
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%6fZ");
        match path.extension() {
            Some(ext) => format!("{}-{}.{}", stem, stamp, ext.to_string_lossy()),
            None => format!("{}-{}", stem, stamp),
        }
    }
}

impl ExportHook for VersionSnapshotHook {
    fn name(&self) -> &str {
        "version-snapshot"
    }

    fn after_export(&self, path: &Path, content: &str) -> Result<()> {
        let digest = Self::digest(content.as_bytes());

        if let Some(latest) = self.latest_snapshot()
            && let Ok(previous) = fs::read(&latest)
            && Self::digest(&previous) == digest
        {
            info!("Content unchanged since {}, no snapshot", latest.display());
            return Ok(());
        }

        fs::create_dir_all(&self.versions_dir)?;
        let snapshot = self.versions_dir.join(Self::snapshot_name(path));
        fs::write(&snapshot, content)?;
        info!("Saved snapshot {}", snapshot.display());
        Ok(())
    }
}

// =============================================================================
// Agent
// =============================================================================

pub struct ExportAgent {
    dir: PathBuf,
    filename: String,
    hooks: Vec<Box<dyn ExportHook>>,
}

impl ExportAgent {
    /// Agent without hooks
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
            hooks: Vec::new(),
        }
    }

    /// Agent with the standard hooks enabled by configuration
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut agent =
            Self::new(&config.dir, &config.filename).with_hook(Box::new(ExportLogHook));
        if config.keep_versions {
            agent = agent.with_hook(Box::new(VersionSnapshotHook::new(&config.dir)));
        }
        agent
    }

    pub fn with_hook(mut self, hook: Box<dyn ExportHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Resolved output path
    pub fn target(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// Produce an `export-confirmation` from a `final-document`
    pub fn run(&self, incoming: &Message) -> Message {
        if let Some(rejection) = check_kind(EXPORTER, incoming, &[MessageKind::FinalDocument]) {
            return rejection;
        }

        let path = self.target();
        if let Err(e) = self.write(&path, incoming.content()) {
            warn!("Export to {} failed: {}", path.display(), e);
            return Message::error(
                EXPORTER,
                CALLER,
                format!("{} failed to write {}: {}", EXPORTER, path.display(), e),
            );
        }

        for hook in &self.hooks {
            if let Err(e) = hook.after_export(&path, incoming.content()) {
                warn!("Post-export hook '{}' failed: {}", hook.name(), e);
            }
        }

        Message::new(
            EXPORTER,
            CALLER,
            MessageKind::ExportConfirmation,
            format!("README saved to: {}", path.display()),
        )
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CraftError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn final_doc(content: &str) -> Message {
        Message::new("FeedbackAgent", EXPORTER, MessageKind::FinalDocument, content)
    }

    struct FailingHook(Arc<AtomicUsize>);

    impl ExportHook for FailingHook {
        fn name(&self) -> &str {
            "failing"
        }

        fn after_export(&self, _path: &Path, _content: &str) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(CraftError::Config("hook broke".to_string()))
        }
    }

    #[test]
    fn test_writes_under_export_dir() {
        let dir = TempDir::new().unwrap();
        let export_dir = dir.path().join("exports");
        let agent = ExportAgent::new(&export_dir, "README.md");

        let reply = agent.run(&final_doc("# Final"));

        let path = export_dir.join("README.md");
        assert_eq!(reply.kind(), &MessageKind::ExportConfirmation);
        assert_eq!(reply.content(), format!("README saved to: {}", path.display()));
        assert_eq!(fs::read_to_string(path).unwrap(), "# Final");
    }

    #[test]
    fn test_rejects_draft() {
        let dir = TempDir::new().unwrap();
        let agent = ExportAgent::new(dir.path(), "README.md");

        let draft = Message::new("WriterAgent", EXPORTER, MessageKind::DraftDocument, "# Draft");
        let reply = agent.run(&draft);

        assert!(reply.is_error());
        assert!(!dir.path().join("README.md").exists());
    }

    #[test]
    fn test_hook_failure_does_not_change_result() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = ExportAgent::new(dir.path(), "README.md")
            .with_hook(Box::new(FailingHook(calls.clone())))
            .with_hook(Box::new(ExportLogHook));

        let reply = agent.run(&final_doc("# Final"));

        assert_eq!(reply.kind(), &MessageKind::ExportConfirmation);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_write_failure_is_error_envelope() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("exports");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let reply = ExportAgent::new(&blocker, "README.md").run(&final_doc("# Final"));

        assert!(reply.is_error());
        assert!(reply.content().contains("failed to write"));
    }

    #[test]
    fn test_snapshots_skip_unchanged_content() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig {
            dir: dir.path().to_path_buf(),
            filename: "README.md".to_string(),
            keep_versions: true,
        };
        let agent = ExportAgent::from_config(&config);
        let versions = dir.path().join(VERSIONS_DIR);

        agent.run(&final_doc("# One"));
        agent.run(&final_doc("# One"));
        assert_eq!(fs::read_dir(&versions).unwrap().count(), 1);

        agent.run(&final_doc("# Two"));
        assert_eq!(fs::read_dir(&versions).unwrap().count(), 2);

        let names: Vec<String> = fs::read_dir(&versions)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| n.starts_with("README-") && n.ends_with(".md")));
    }
}
