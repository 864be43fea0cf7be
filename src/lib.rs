//! readmecraft - Multi-Agent README Generator
//!
//! Analyzes a code repository and produces a README through a chain of
//! LLM-backed agents that pass typed message envelopes to each other.
//!
//! ## Core Features
//!
//! - **Repository Analysis**: bounded summary of tree, languages, dependencies,
//!   CI/CD, Docker, badges, API endpoints and tests
//! - **Template Writer**: basic, detailed or creative READMEs with selectable sections
//! - **Diagram Overview**: image-capable generation appends a system overview
//! - **Feedback Rounds**: free-text revisions of the latest draft
//! - **Export & Publish**: local file with optional version snapshots, or a
//!   commit through the GitHub contents API
//!
//! ## Quick Start
//!
//! ```ignore
//! use readmecraft::{ConfigLoader, GenerateOptions, Pipeline, Session};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = Pipeline::new(config);
//! let mut session = Session::new("https://github.com/octo/app");
//! let draft = pipeline.generate(&mut session, &GenerateOptions::default()).await?;
//! pipeline.export(&mut session)?;
//! ```
//!
//! ## Modules
//!
//! - [`types`]: message envelope and error taxonomy
//! - [`ai`]: generation providers, timeouts, prompt building
//! - [`analyzer`]: source acquisition and repository summary
//! - [`agents`]: the analyzer, writer, vision, feedback, export and publish steps
//! - [`session`] / [`pipeline`]: envelope history and step sequencing

pub mod agents;
pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod session;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, Section, Template};

// Envelope & Error Types
pub use types::{CraftError, ErrorCategory, Message, MessageId, MessageKind, Result};

// Pipeline
pub use pipeline::{GenerateOptions, Pipeline};
pub use session::Session;

// =============================================================================
// Agent Re-exports
// =============================================================================

pub use agents::{
    AnalyzerAgent, ExportAgent, ExportHook, FeedbackAgent, GitHubApi, HostingApi, PublishAgent,
    VisionAgent, WriterAgent,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, TextGenerator, TimeoutConfig, with_timeout};

// =============================================================================
// Analyzer Re-exports
// =============================================================================

pub use analyzer::{FileScanner, RepositoryAnalyzer, RepositorySummary, SourceFetcher};
