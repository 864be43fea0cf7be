//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/readmecraft/) and project (.readmecraft/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{analysis, export, network, publish};
use crate::types::{CraftError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation backend settings
    pub llm: LlmConfig,

    /// Document writer settings
    pub writer: WriterConfig,

    /// Repository analysis settings
    pub analysis: AnalysisConfig,

    /// Local export settings
    pub export: ExportConfig,

    /// Remote publish settings
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            writer: WriterConfig::default(),
            analysis: AnalysisConfig::default(),
            export: ExportConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(CraftError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(CraftError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(CraftError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.analysis.max_tree_entries == 0 || self.analysis.max_list_items == 0 {
            return Err(CraftError::Config(
                "analysis limits must be greater than 0".to_string(),
            ));
        }

        if self.export.filename.is_empty()
            || self.export.filename.contains(['/', '\\'])
            || self.export.filename == ".."
        {
            return Err(CraftError::Config(format!(
                "export filename must be a plain file name, got '{}'",
                self.export.filename
            )));
        }

        if self.publish.branch.trim().is_empty() || self.publish.path.trim().is_empty() {
            return Err(CraftError::Config(
                "publish branch and path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Writer Template & Sections
// =============================================================================

/// README style requested from the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Simple but informative
    #[default]
    Basic,
    /// Emojis, badges and clear headings
    Detailed,
    /// Distinctive, visually striking layout
    Creative,
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Template::Basic => write!(f, "Basic"),
            Template::Detailed => write!(f, "Detailed"),
            Template::Creative => write!(f, "Creative"),
        }
    }
}

impl std::str::FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Template::Basic),
            "detailed" => Ok(Template::Detailed),
            "creative" => Ok(Template::Creative),
            _ => Err(format!(
                "Unknown template: {}. Valid values: basic, detailed, creative",
                s
            )),
        }
    }
}

/// Optional README section the writer can be asked to include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Installation,
    Usage,
    Contributing,
    License,
    Faq,
    Troubleshooting,
    Security,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Installation,
        Section::Usage,
        Section::Contributing,
        Section::License,
        Section::Faq,
        Section::Troubleshooting,
        Section::Security,
    ];

    /// Heading used in the generated README
    pub fn title(&self) -> &'static str {
        match self {
            Section::Installation => "Installation",
            Section::Usage => "Usage",
            Section::Contributing => "Contributing",
            Section::License => "License",
            Section::Faq => "FAQ",
            Section::Troubleshooting => "Troubleshooting",
            Section::Security => "Security",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .find(|section| section.title().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown section: {}. Valid values: installation, usage, contributing, license, faq, troubleshooting, security",
                    s
                )
            })
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: gemini, openai, ollama
    pub provider: String,

    /// Model used for text generation
    pub model: String,

    /// Model used for diagram analysis (defaults to `model`)
    pub vision_model: Option<String>,

    /// Custom API endpoint
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            vision_model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: 8192,
        }
    }
}

// =============================================================================
// Writer Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// README template
    pub template: Template,

    /// Optional sections to request
    pub sections: Vec<Section>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            template: Template::Basic,
            sections: vec![
                Section::Installation,
                Section::Usage,
                Section::Contributing,
                Section::License,
            ],
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Glob patterns to exclude from the walk
    pub exclude: Vec<String>,

    /// Files larger than this are listed but never read
    pub max_file_size: u64,

    /// Maximum tree lines in the summary
    pub max_tree_entries: usize,

    /// Maximum entries in endpoint and test-file lists
    pub max_list_items: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/__pycache__/**".to_string(),
                "**/.venv/**".to_string(),
                "**/dist/**".to_string(),
            ],
            max_file_size: analysis::MAX_FILE_SIZE,
            max_tree_entries: analysis::MAX_TREE_ENTRIES,
            max_list_items: analysis::MAX_LIST_ITEMS,
        }
    }
}

// =============================================================================
// Export Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Export directory
    pub dir: PathBuf,

    /// Exported file name
    pub filename: String,

    /// Keep timestamped copies under `<dir>/versions/`
    pub keep_versions: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(export::DEFAULT_DIR),
            filename: export::DEFAULT_FILENAME.to_string(),
            keep_versions: false,
        }
    }
}

// =============================================================================
// Publish Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Hosting API base URL
    pub api_base: String,

    /// Target branch
    pub branch: String,

    /// Target path inside the repository
    pub path: String,

    /// Commit message
    pub commit_message: String,

    /// API token (falls back to GITHUB_TOKEN). Never serialized.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl std::fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishConfig")
            .field("api_base", &self.api_base)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("commit_message", &self.commit_message)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_base: publish::DEFAULT_API_BASE.to_string(),
            branch: publish::DEFAULT_BRANCH.to_string(),
            path: publish::DEFAULT_PATH.to_string(),
            commit_message: publish::DEFAULT_COMMIT_MESSAGE.to_string(),
            token: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
