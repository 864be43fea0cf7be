//! Repository Analysis
//!
//! - Source acquisition (local directory or shallow git clone)
//! - File scanning with gitignore support
//! - Summary extraction: tree, languages, manifests and heuristic signals

pub mod manifest;
pub mod repository;
pub mod scanner;
pub mod signals;
pub mod source;

pub use repository::{CappedList, RepositoryAnalyzer, RepositorySummary};
pub use scanner::{FileScanner, ScannedFile};
pub use source::{FetchedSource, GitFetcher, SourceFetcher};
