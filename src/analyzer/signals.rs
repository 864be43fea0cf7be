//! Heuristic repository signals: CI configuration, container files, README
//! badges, HTTP route declarations and test files.
//!
//! Everything here is pattern matching on names and lines, never parsing.

use regex::Regex;
use std::sync::LazyLock;

const CI_FILE_NAMES: &[&str] = &[
    ".gitlab-ci.yml",
    "Jenkinsfile",
    "azure-pipelines.yml",
    ".travis.yml",
];

const CONTAINER_FILE_NAMES: &[&str] = &[
    "Dockerfile",
    "Containerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

const BADGE_MARKERS: &[&str] = &["img.shields.io", "badge.svg"];

static PYTHON_ROUTE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"@(?:app\.(?:route|get|post|put|patch|delete)|router\.(?:get|post|put|patch|delete|api_route))\s*\(|\badd_url_rule\s*\(",
    )
    .ok()
});

static SCRIPT_ROUTE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:app|router)\.(?:get|post|put|patch|delete|all)\s*\(").ok()
});

/// `relative` is a `/`-separated path from the repository root
pub fn is_ci_config(relative: &str) -> bool {
    let name = file_name(relative);
    if CI_FILE_NAMES.contains(&name) {
        return true;
    }
    if relative == ".circleci/config.yml" || relative.ends_with("/.circleci/config.yml") {
        return true;
    }
    let in_workflows =
        relative.starts_with(".github/workflows/") || relative.contains("/.github/workflows/");
    in_workflows && (name.ends_with(".yml") || name.ends_with(".yaml"))
}

pub fn is_container_config(relative: &str) -> bool {
    CONTAINER_FILE_NAMES.contains(&file_name(relative))
}

/// README-like file whose lines are searched for badges
pub fn is_readme(relative: &str) -> bool {
    file_name(relative).eq_ignore_ascii_case("readme.md")
}

/// Trimmed lines carrying a badge image
pub fn badge_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| BADGE_MARKERS.iter().any(|m| line.contains(m)))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Trimmed lines that declare an HTTP route, for supported source types
pub fn route_lines(relative: &str, content: &str) -> Vec<String> {
    let pattern = match extension(relative) {
        Some("py") => PYTHON_ROUTE.as_ref(),
        Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx") => SCRIPT_ROUTE.as_ref(),
        _ => None,
    };
    let Some(pattern) = pattern else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|line| pattern.is_match(line))
        .map(|line| line.trim().to_string())
        .collect()
}

pub fn is_route_source(relative: &str) -> bool {
    matches!(
        extension(relative),
        Some("py" | "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx")
    )
}

/// Test-naming conventions across Python, Go and JavaScript/TypeScript
pub fn is_test_file(relative: &str) -> bool {
    let name = file_name(relative);
    name.starts_with("test_")
        || name.ends_with("_test.py")
        || name.ends_with("_test.go")
        || [".spec.js", ".spec.ts", ".test.js", ".test.ts"]
            .iter()
            .any(|suffix| name.ends_with(suffix))
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

fn extension(relative: &str) -> Option<&str> {
    let name = file_name(relative);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() { None } else { Some(ext) }
}
