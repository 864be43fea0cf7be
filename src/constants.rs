//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Agent identifiers used as envelope sender/receiver
pub mod agents {
    pub const ANALYZER: &str = "AnalyzerAgent";
    pub const WRITER: &str = "WriterAgent";
    pub const VISION: &str = "VisionAgent";
    pub const FEEDBACK: &str = "FeedbackAgent";
    pub const EXPORTER: &str = "ExportAgent";
    pub const PUBLISHER: &str = "PublishAgent";
    /// The session re-issuing or promoting documents between steps
    pub const SESSION: &str = "Session";
    /// The driving caller (CLI)
    pub const CALLER: &str = "CLI";
}

/// Repository summary layout shared by the analyzer and the writer
pub mod summary {
    pub const STRUCTURE_HEADER: &str = "Repository structure:";
    pub const LANGUAGES_HEADER: &str = "Detected languages:";
    pub const DEPENDENCIES: &str = "Dependencies:";
    pub const CI_CD: &str = "CI/CD:";
    pub const DOCKER: &str = "Docker:";
    pub const BADGES: &str = "Badges:";
    pub const API_ENDPOINTS: &str = "API Endpoints:";
    pub const TEST_FILES: &str = "Test files:";

    /// Placeholder for an empty best-effort field
    pub const NONE_FOUND: &str = "None found";

    /// Number of extensions reported in the language histogram
    pub const TOP_EXTENSIONS: usize = 5;
}

/// Repository analysis limits
pub mod analysis {
    /// Maximum file size to read for dependency/endpoint/badge detection (1MB)
    pub const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Maximum tree lines in the summary
    pub const MAX_TREE_ENTRIES: usize = 400;

    /// Maximum items in endpoint and test-file lists
    pub const MAX_LIST_ITEMS: usize = 50;
}

/// Generation constants
pub mod generation {
    /// Prefix of the text substituted for a failed generation call
    pub const FAILURE_MARKER: &str = "[generation failed]";

    /// Heading placed above the diagram-derived section
    pub const OVERVIEW_HEADING: &str = "🧭 **System Overview**";

    /// Default instruction sent with a diagram
    pub const DEFAULT_VISION_PROMPT: &str = "Analyze the following system diagram and provide a detailed explanation. \
Describe the main components, their interactions, and the overall architecture of the system.";
}

/// Export defaults
pub mod export {
    pub const DEFAULT_DIR: &str = "exports";
    pub const DEFAULT_FILENAME: &str = "README.md";
    pub const VERSIONS_DIR: &str = "versions";
}

/// Hosting API defaults
pub mod publish {
    pub const DEFAULT_API_BASE: &str = "https://api.github.com";
    pub const DEFAULT_BRANCH: &str = "main";
    pub const DEFAULT_PATH: &str = "README.md";
    pub const DEFAULT_COMMIT_MESSAGE: &str = "docs: update README";
}

/// HTTP/Network constants
pub mod network {
    /// Default generation request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Hosting API request timeout (seconds)
    pub const HOSTING_TIMEOUT_SECS: u64 = 30;

    pub const USER_AGENT: &str = concat!("readmecraft/", env!("CARGO_PKG_VERSION"));
}
