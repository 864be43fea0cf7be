//! Analyzer Agent
//!
//! First pipeline step: materializes the source tree and emits its summary
//! as a `repository-summary` envelope for the writer.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::analyzer::{GitFetcher, RepositoryAnalyzer, SourceFetcher};
use crate::config::AnalysisConfig;
use crate::constants::agents::{ANALYZER, WRITER};
use crate::types::{Message, MessageKind, Result};

pub struct AnalyzerAgent {
    fetcher: Arc<dyn SourceFetcher>,
    analyzer: RepositoryAnalyzer,
}

impl AnalyzerAgent {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_fetcher(config, Arc::new(GitFetcher::new()))
    }

    pub fn with_fetcher(config: AnalysisConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            fetcher,
            analyzer: RepositoryAnalyzer::new(config),
        }
    }

    /// Fetch `reference` and summarize it.
    ///
    /// Acquisition failures are returned as `Err`; the temporary checkout,
    /// if any, is removed before this returns.
    pub async fn run(&self, reference: &str) -> Result<Message> {
        let source = self.fetcher.fetch(reference).await?;
        let message = self.analyze_path(source.path())?;
        info!(
            "Analyzed {} ({})",
            source.reference(),
            if source.is_temporary() { "clone" } else { "local" }
        );
        Ok(message)
    }

    /// Summarize an already-materialized tree
    pub fn analyze_path(&self, root: &Path) -> Result<Message> {
        let summary = self.analyzer.analyze(root)?;
        Ok(Message::new(
            ANALYZER,
            WRITER,
            MessageKind::RepositorySummary,
            summary.render(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::FetchedSource;
    use crate::types::CraftError;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct UnreachableFetcher;

    #[async_trait]
    impl SourceFetcher for UnreachableFetcher {
        async fn fetch(&self, reference: &str) -> Result<FetchedSource> {
            Err(CraftError::fetch(reference, "host unreachable"))
        }
    }

    #[tokio::test]
    async fn test_local_tree_produces_summary() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();

        let agent = AnalyzerAgent::new(AnalysisConfig::default());
        let message = agent.run(&dir.path().to_string_lossy()).await.unwrap();

        assert_eq!(message.kind(), &MessageKind::RepositorySummary);
        assert_eq!(message.sender(), ANALYZER);
        assert_eq!(message.receiver(), WRITER);
        assert!(message.content().contains("- main.py"));
        assert!(message.content().contains(".py: 1"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_distinct_error() {
        let agent =
            AnalyzerAgent::with_fetcher(AnalysisConfig::default(), Arc::new(UnreachableFetcher));
        let err = agent.run("https://github.com/o/r").await.unwrap_err();
        assert!(matches!(err, CraftError::Fetch { .. }));
        assert!(err.to_string().contains("host unreachable"));
    }
}
