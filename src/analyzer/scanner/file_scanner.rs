use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::analysis::MAX_FILE_SIZE;
use crate::types::{CraftError, Result};

/// Gitignore-aware, deterministic walk of a source tree.
///
/// Entries are visited sorted by file name so the same tree always yields
/// the same sequence. Symlinks are never followed and `.git` is skipped.
pub struct FileScanner {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude: vec![],
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Glob patterns matched against the `/`-separated relative path.
    /// Invalid patterns are ignored.
    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    debug!("Ignoring invalid exclude pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and return every kept file.
    ///
    /// Fails only when the root itself is not a readable directory;
    /// unreadable entries below it are skipped.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let metadata = std::fs::metadata(&self.root).map_err(|e| {
            CraftError::fetch(self.root.display().to_string(), e.to_string())
        })?;
        if !metadata.is_dir() {
            return Err(CraftError::fetch(
                self.root.display().to_string(),
                "not a directory",
            ));
        }
        std::fs::read_dir(&self.root).map_err(|e| {
            CraftError::fetch(self.root.display().to_string(), e.to_string())
        })?;

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut files = Vec::new();

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = self.relative(path) else {
                continue;
            };

            if self.should_exclude(&relative) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative,
                size: metadata.len(),
                readable: metadata.len() <= self.max_file_size,
            });
        }

        debug!("Scanned {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    fn should_exclude(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub relative: String,
    pub size: u64,
    /// Within the size limit, so its content may be read
    pub readable: bool,
}

impl ScannedFile {
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }

    /// Extension including the leading dot (`.py`), if any
    pub fn extension(&self) -> Option<String> {
        Path::new(self.file_name())
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
    }

    /// Read the content as text, lossily. `None` when over the size limit or unreadable.
    pub fn read_text(&self) -> Option<String> {
        if !self.readable {
            return None;
        }
        std::fs::read(&self.path)
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_is_sorted_and_relative() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py", "");
        touch(dir.path(), "a/z.rs", "");
        touch(dir.path(), "a/c.rs", "");

        let files = FileScanner::new(dir.path()).scan().unwrap();
        let names: Vec<_> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["a/c.rs", "a/z.rs", "b.py"]);
    }

    #[test]
    fn test_exclude_and_git_dir_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".git/HEAD", "ref");
        touch(dir.path(), "node_modules/x/index.js", "");
        touch(dir.path(), "src/app.js", "");

        let files = FileScanner::new(dir.path())
            .with_exclude(&["**/node_modules/**".to_string()])
            .scan()
            .unwrap();
        let names: Vec<_> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["src/app.js"]);
    }

    #[test]
    fn test_large_files_listed_not_read() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "big.txt", "0123456789");

        let files = FileScanner::new(dir.path())
            .with_max_file_size(4)
            .scan()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(!files[0].readable);
        assert!(files[0].read_text().is_none());
    }

    #[test]
    fn test_missing_root_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        let result = FileScanner::new(dir.path().join("missing")).scan();
        assert!(matches!(result, Err(CraftError::Fetch { .. })));
    }

    #[test]
    fn test_extension() {
        let file = ScannedFile {
            path: PathBuf::from("x"),
            relative: "pkg/mod.test.ts".to_string(),
            size: 0,
            readable: true,
        };
        assert_eq!(file.file_name(), "mod.test.ts");
        assert_eq!(file.extension().as_deref(), Some(".ts"));
    }
}
