//! Repository Analyzer
//!
//! Inspects a materialized source tree and produces the bounded textual
//! summary consumed by the writer. Every field except the tree is best
//! effort: unreadable files are skipped, malformed manifests contribute
//! nothing, and an empty tree still yields a complete summary.

use std::path::Path;

use tracing::{debug, info};

use super::manifest::ManifestKind;
use super::scanner::{FileScanner, ScannedFile};
use super::signals;
use crate::config::AnalysisConfig;
use crate::constants::summary;
use crate::types::Result;

/// A list truncated to a maximum length, remembering how much was dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CappedList {
    pub items: Vec<String>,
    pub omitted: usize,
}

impl CappedList {
    pub fn new(mut items: Vec<String>, max: usize) -> Self {
        let omitted = items.len().saturating_sub(max);
        items.truncate(max);
        Self { items, omitted }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn elision(&self) -> Option<String> {
        (self.omitted > 0).then(|| format!("... ({} more entries)", self.omitted))
    }

    /// Comma-joined items, or the "None found" placeholder
    fn render_inline(&self) -> String {
        if self.items.is_empty() {
            return summary::NONE_FOUND.to_string();
        }
        let mut parts = self.items.clone();
        parts.extend(self.elision());
        parts.join(", ")
    }

    fn render_lines(&self) -> String {
        let mut lines = self.items.clone();
        lines.extend(self.elision());
        lines.join("\n")
    }
}

/// Structured result of one analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySummary {
    pub tree: CappedList,
    /// Extension histogram, most frequent first
    pub languages: Vec<(String, usize)>,
    pub dependencies: Vec<String>,
    pub ci: Vec<String>,
    pub docker: bool,
    pub badges: Vec<String>,
    pub endpoints: CappedList,
    pub tests: CappedList,
}

impl RepositorySummary {
    /// Render the summary in the layout the writer parses
    pub fn render(&self) -> String {
        let languages = self
            .languages
            .iter()
            .map(|(ext, count)| format!("{}: {}", ext, count))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        out.push_str(summary::STRUCTURE_HEADER);
        out.push('\n');
        out.push_str(&self.tree.render_lines());
        out.push_str("\n\n");
        out.push_str(summary::LANGUAGES_HEADER);
        out.push('\n');
        out.push_str(&languages);
        out.push_str("\n\n");

        let fields = [
            (summary::DEPENDENCIES, inline(&self.dependencies)),
            (summary::CI_CD, inline(&self.ci)),
            (
                summary::DOCKER,
                if self.docker { "Yes" } else { "No" }.to_string(),
            ),
            (summary::BADGES, inline(&self.badges)),
            (summary::API_ENDPOINTS, self.endpoints.render_inline()),
            (summary::TEST_FILES, self.tests.render_inline()),
        ];
        for (label, value) in fields {
            out.push_str(&format!("{} {}\n", label, value));
        }

        out
    }
}

fn inline(items: &[String]) -> String {
    if items.is_empty() {
        summary::NONE_FOUND.to_string()
    } else {
        items.join(", ")
    }
}

/// Walks a source tree and gathers every summary field in one pass
#[derive(Debug, Clone, Default)]
pub struct RepositoryAnalyzer {
    config: AnalysisConfig,
}

impl RepositoryAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze the tree rooted at `root`.
    ///
    /// Fails with a fetch error only when `root` is not a readable directory.
    pub fn analyze(&self, root: &Path) -> Result<RepositorySummary> {
        let files = FileScanner::new(root)
            .with_exclude(&self.config.exclude)
            .with_max_file_size(self.config.max_file_size)
            .scan()?;

        info!("Analyzing {} files in {}", files.len(), root.display());

        let mut dependencies = Vec::new();
        let mut ci = Vec::new();
        let mut docker = false;
        let mut badges = Vec::new();
        let mut endpoints = Vec::new();
        let mut tests = Vec::new();

        for file in &files {
            let relative = file.relative.as_str();

            if signals::is_ci_config(relative) {
                ci.push(file.relative.clone());
            }
            if signals::is_container_config(relative) {
                docker = true;
            }
            if signals::is_test_file(relative) {
                tests.push(file.relative.clone());
            }

            let manifest = ManifestKind::from_file_name(file.file_name());
            let wants_content =
                manifest.is_some() || signals::is_readme(relative) || signals::is_route_source(relative);
            if !wants_content {
                continue;
            }
            let Some(content) = file.read_text() else {
                debug!("Skipping unreadable or oversized file: {}", relative);
                continue;
            };

            if let Some(kind) = manifest {
                dependencies.extend(kind.dependencies(&content));
            }
            if signals::is_readme(relative) {
                badges.extend(signals::badge_lines(&content));
            }
            endpoints.extend(signals::route_lines(relative, &content));
        }

        Ok(RepositorySummary {
            tree: CappedList::new(render_tree(&files), self.config.max_tree_entries),
            languages: extension_histogram(&files),
            dependencies,
            ci,
            docker,
            badges,
            endpoints: CappedList::new(endpoints, self.config.max_list_items),
            tests: CappedList::new(tests, self.config.max_list_items),
        })
    }
}

/// Indented listing; directories are emitted the first time a file below them appears
fn render_tree(files: &[ScannedFile]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Vec<&str> = Vec::new();

    for file in files {
        let parts: Vec<&str> = file.relative.split('/').collect();
        let Some((name, dirs)) = parts.split_last() else {
            continue;
        };

        let shared = previous
            .iter()
            .zip(dirs.iter())
            .take_while(|(a, b)| a == b)
            .count();
        for (depth, dir) in dirs.iter().enumerate().skip(shared) {
            lines.push(format!("{}- {}/", "  ".repeat(depth), dir));
        }
        lines.push(format!("{}- {}", "  ".repeat(dirs.len()), name));

        previous = dirs.to_vec();
    }

    lines
}

/// Top extensions by count; ties keep first-encountered order
fn extension_histogram(files: &[ScannedFile]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ext in files.iter().filter_map(ScannedFile::extension) {
        match counts.iter_mut().find(|(seen, _)| *seen == ext) {
            Some((_, count)) => *count += 1,
            None => counts.push((ext, 1)),
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(summary::TOP_EXTENSIONS);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_empty_tree_has_placeholders() {
        let dir = TempDir::new().unwrap();
        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        let text = summary.render();

        assert!(summary.tree.is_empty());
        assert!(text.starts_with("Repository structure:\n\n\nDetected languages:\n\n\n"));
        for label in [
            "Dependencies:",
            "CI/CD:",
            "Badges:",
            "API Endpoints:",
            "Test files:",
        ] {
            assert!(
                text.contains(&format!("{} None found", label)),
                "missing placeholder for {label}"
            );
        }
        assert!(text.contains("Docker: No"));
    }

    #[test]
    fn test_histogram_ranks_descending() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.py", "");
        write(dir.path(), "b.py", "");
        write(dir.path(), "c.js", "");

        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        assert_eq!(
            summary.languages,
            vec![(".py".to_string(), 2), (".js".to_string(), 1)]
        );
        assert!(summary.render().contains("Detected languages:\n.py: 2, .js: 1\n"));
    }

    #[test]
    fn test_histogram_ties_keep_walk_order() {
        let dir = TempDir::new().unwrap();
        for name in ["a.go", "b.rs", "c.ts", "d.md", "e.sh", "f.rb", "g.rb"] {
            write(dir.path(), name, "");
        }

        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        let exts: Vec<_> = summary.languages.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(exts, vec![".rb", ".go", ".rs", ".ts", ".md"]);
    }

    #[test]
    fn test_full_summary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "requirements.txt", "flask\n# pinned\ngunicorn\n");
        write(dir.path(), "Dockerfile", "FROM python:3.12\n");
        write(dir.path(), ".github/workflows/ci.yml", "on: push\n");
        write(
            dir.path(),
            "README.md",
            "# App\n![build](https://img.shields.io/badge/build-passing-green)\n",
        );
        write(dir.path(), "app/main.py", "@app.route('/')\ndef index():\n    pass\n");
        write(dir.path(), "tests/test_main.py", "def test_x(): pass\n");

        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        let text = summary.render();

        assert!(text.contains("Dependencies: flask, gunicorn\n"));
        assert!(text.contains("CI/CD: .github/workflows/ci.yml\n"));
        assert!(text.contains("Docker: Yes\n"));
        assert!(text.contains("Badges: ![build](https://img.shields.io/badge/build-passing-green)\n"));
        assert!(text.contains("API Endpoints: @app.route('/')\n"));
        assert!(text.contains("Test files: tests/test_main.py\n"));
        assert!(text.contains("- app/\n  - main.py"));
    }

    #[test]
    fn test_tree_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/lib/a.rs", "");
        write(dir.path(), "src/main.rs", "");
        write(dir.path(), "Cargo.toml", "[package]\nname = \"x\"\n");

        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        assert_eq!(
            summary.tree.items,
            vec!["- Cargo.toml", "- src/", "  - lib/", "    - a.rs", "  - main.rs"]
        );
    }

    #[test]
    fn test_lists_are_capped() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("test_{i}.py"), "");
        }
        let config = AnalysisConfig {
            max_list_items: 2,
            max_tree_entries: 3,
            ..AnalysisConfig::default()
        };

        let summary = RepositoryAnalyzer::new(config).analyze(dir.path()).unwrap();
        let text = summary.render();
        assert!(text.contains("Test files: test_0.py, test_1.py, ... (3 more entries)\n"));
        assert!(text.contains("- test_2.py\n... (2 more entries)\n"));
    }

    #[test]
    fn test_unreachable_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(
            RepositoryAnalyzer::default()
                .analyze(&dir.path().join("nope"))
                .is_err()
        );
    }

    #[test]
    fn test_malformed_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{ broken");
        write(dir.path(), "requirements.txt", "click\n");

        let summary = RepositoryAnalyzer::default().analyze(dir.path()).unwrap();
        assert_eq!(summary.dependencies, vec!["click"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entries_are_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "requirements.txt", "flask\n");
        write(dir.path(), "package.json", r#"{"dependencies":{"express":"^4"}}"#);
        write(dir.path(), "private/test_secret.py", "");
        write(dir.path(), "Dockerfile", "FROM node:20\n");
        write(dir.path(), "tests/test_app.py", "");

        let locked_file = dir.path().join("requirements.txt");
        let locked_dir = dir.path().join("private");
        fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o000)).unwrap();
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind a privileged user
        let enforced = fs::read(&locked_file).is_err();

        let result = RepositoryAnalyzer::default().analyze(dir.path());

        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o644)).unwrap();

        let summary = result.unwrap();
        assert!(summary.docker);
        assert!(summary.dependencies.contains(&"express".to_string()));
        assert!(summary.tests.items.contains(&"tests/test_app.py".to_string()));
        if enforced {
            assert_eq!(summary.dependencies, vec!["express"]);
            assert_eq!(summary.tests.items, vec!["tests/test_app.py"]);
        }
        assert!(summary.render().contains("Docker: Yes"));
    }
}
