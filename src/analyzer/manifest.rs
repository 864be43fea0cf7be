//! Dependency manifests
//!
//! Best-effort extraction of declared dependency names. A manifest that
//! fails to parse contributes nothing.

use serde_json::Value as JsonValue;
use tracing::debug;

/// Manifest formats the analyzer recognizes, keyed by exact file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Requirements,
    PackageJson,
    PyProject,
    Cargo,
    GoMod,
}

impl ManifestKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "requirements.txt" => Some(Self::Requirements),
            "package.json" => Some(Self::PackageJson),
            "pyproject.toml" => Some(Self::PyProject),
            "Cargo.toml" => Some(Self::Cargo),
            "go.mod" => Some(Self::GoMod),
            _ => None,
        }
    }

    /// Dependency entries declared in `content`
    pub fn dependencies(&self, content: &str) -> Vec<String> {
        match self {
            Self::Requirements => requirements(content),
            Self::PackageJson => package_json(content),
            Self::PyProject => pyproject(content),
            Self::Cargo => cargo(content),
            Self::GoMod => go_mod(content),
        }
    }
}

fn requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn package_json(content: &str) -> Vec<String> {
    match serde_json::from_str::<JsonValue>(content) {
        Ok(pkg) => pkg
            .get("dependencies")
            .and_then(JsonValue::as_object)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default(),
        Err(e) => {
            debug!("Skipping malformed package.json: {}", e);
            Vec::new()
        }
    }
}

fn pyproject(content: &str) -> Vec<String> {
    match content.parse::<toml::Table>() {
        Ok(doc) => doc
            .get("project")
            .and_then(|p| p.get("dependencies"))
            .and_then(toml::Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(toml::Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        Err(e) => {
            debug!("Skipping malformed pyproject.toml: {}", e);
            Vec::new()
        }
    }
}

fn cargo(content: &str) -> Vec<String> {
    match content.parse::<toml::Table>() {
        Ok(doc) => doc
            .get("dependencies")
            .and_then(toml::Value::as_table)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default(),
        Err(e) => {
            debug!("Skipping malformed Cargo.toml: {}", e);
            Vec::new()
        }
    }
}

fn go_mod(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if in_block {
            if line == ")" {
                in_block = false;
            } else if let Some(module) = line.split_whitespace().next() {
                deps.push(module.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
            } else if let Some(module) = rest.split_whitespace().next() {
                deps.push(module.to_string());
            }
        }
    }

    deps
}
