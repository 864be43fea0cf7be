//! README Pipeline
//!
//! Drives the agents against a [`Session`].
//!
//! ```text
//! Analyzer → Writer → (Vision) → Feedback × N → Export / Publish
//! ```
//!
//! Each step reads its input from the session, runs one agent, and records
//! the produced envelope. Steps return:
//! - `Err` for acquisition and ordering failures (nothing recorded);
//! - `Ok(envelope)` otherwise, where an `error` envelope means the step was
//!   refused and the caller decides whether to stop.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::agents::vision::read_diagram;
use crate::agents::{
    AnalyzerAgent, ExportAgent, FeedbackAgent, HostingApi, PublishAgent, VisionAgent, WriterAgent,
};
use crate::ai::{ProviderConfig, SharedProvider, TextGenerator, TimeoutConfig, create_provider};
use crate::analyzer::SourceFetcher;
use crate::config::Config;
use crate::constants::agents::{EXPORTER, PUBLISHER, SESSION};
use crate::session::Session;
use crate::types::{CraftError, Message, Result};

/// Optional steps of a full generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions<'a> {
    /// Architecture diagram to describe
    pub diagram: Option<&'a Path>,
    /// Feedback rounds, applied in order
    pub feedback: Vec<String>,
}

pub struct Pipeline {
    config: Config,
    timeouts: TimeoutConfig,
    /// Overrides for the configured collaborators
    provider: Option<SharedProvider>,
    fetcher: Option<Arc<dyn SourceFetcher>>,
    hosting: Option<Arc<dyn HostingApi>>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            timeouts: TimeoutConfig::with_llm_secs(config.llm.timeout_secs),
            config,
            provider: None,
            fetcher: None,
            hosting: None,
        }
    }

    /// Use `provider` for both text and diagram generation
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_hosting(mut self, hosting: Arc<dyn HostingApi>) -> Self {
        self.hosting = Some(hosting);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn provider(&self, provider_config: &ProviderConfig) -> Result<SharedProvider> {
        match &self.provider {
            Some(provider) => Ok(provider.clone()),
            None => create_provider(provider_config),
        }
    }

    fn generator(&self, provider_config: ProviderConfig) -> Result<TextGenerator> {
        let provider = self.provider(&provider_config)?;
        Ok(TextGenerator::new(provider, self.timeouts.llm_request))
    }

    fn text_generator(&self) -> Result<TextGenerator> {
        self.generator(ProviderConfig::from_llm(&self.config.llm))
    }

    fn vision_generator(&self) -> Result<TextGenerator> {
        self.generator(ProviderConfig::vision_from_llm(&self.config.llm))
    }

    /// Probe the text provider before a run.
    ///
    /// `Ok(false)` means the provider answered but is not usable with the
    /// configured model; the caller decides whether to continue.
    pub async fn preflight(&self) -> Result<bool> {
        let provider = self.provider(&ProviderConfig::from_llm(&self.config.llm))?;
        let healthy = provider.health_check().await?;
        if healthy {
            info!("Provider '{}' is healthy", provider.name());
        } else {
            warn!("Provider '{}' health check inconclusive", provider.name());
        }
        Ok(healthy)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Summarize the session's source repository
    #[instrument(skip_all)]
    pub async fn analyze(&self, session: &mut Session) -> Result<Message> {
        let reference = session
            .source()
            .ok_or_else(|| CraftError::Session("session has no source repository".into()))?
            .to_string();

        let agent = match &self.fetcher {
            Some(fetcher) => AnalyzerAgent::with_fetcher(self.config.analysis.clone(), fetcher.clone()),
            None => AnalyzerAgent::new(self.config.analysis.clone()),
        };
        let summary = agent.run(&reference).await?;
        Ok(session.record(summary).clone())
    }

    /// Draft a README from the latest summary
    #[instrument(skip_all)]
    pub async fn write(&self, session: &mut Session) -> Result<Message> {
        let input = session.writer_input()?;
        let agent = WriterAgent::new(self.text_generator()?, self.config.writer.clone());
        let draft = agent.run(&input).await;
        Ok(session.record(draft).clone())
    }

    /// Append the diagram overview to the latest document
    #[instrument(skip(self, session))]
    pub async fn annotate(&self, session: &mut Session, diagram: &Path) -> Result<Message> {
        let bytes = read_diagram(diagram)?;
        let input = session.vision_input()?;
        let agent = VisionAgent::new(self.vision_generator()?);
        let annotated = agent.run(bytes, &input).await;
        Ok(session.record(annotated).clone())
    }

    /// Apply one feedback round to the latest document
    #[instrument(skip_all)]
    pub async fn revise(&self, session: &mut Session, feedback: &str) -> Result<Message> {
        let input = session.feedback_input()?;
        let agent = FeedbackAgent::new(self.text_generator()?);
        if input.sender() == SESSION {
            session.record(input.clone());
        }
        let revised = agent.run(feedback, &input).await;
        Ok(session.record(revised).clone())
    }

    /// Write the latest document to the export directory
    #[instrument(skip_all)]
    pub fn export(&self, session: &mut Session) -> Result<Message> {
        let input = session.output_input(EXPORTER)?;
        if input.sender() == SESSION {
            info!("Promoting latest draft to final document for export");
            session.record(input.clone());
        }
        let confirmation = ExportAgent::from_config(&self.config.export).run(&input);
        Ok(session.record(confirmation).clone())
    }

    /// Commit the latest document to `repository`
    #[instrument(skip(self, session))]
    pub async fn publish(&self, session: &mut Session, repository: &str) -> Result<Message> {
        let input = session.output_input(PUBLISHER)?;
        let publish = &self.config.publish;
        let agent = match &self.hosting {
            Some(api) => PublishAgent::new(
                api.clone(),
                &publish.branch,
                &publish.path,
                &publish.commit_message,
            ),
            None => PublishAgent::from_config(publish, self.timeouts.hosting_request)?,
        };
        if input.sender() == SESSION {
            info!("Promoting latest draft to final document for publishing");
            session.record(input.clone());
        }
        let status = agent.run(repository, &input).await;
        Ok(session.record(status).clone())
    }

    /// Analyze, write, and optionally annotate and revise.
    ///
    /// Stops at the first `error` envelope and returns it.
    pub async fn generate(&self, session: &mut Session, options: &GenerateOptions<'_>) -> Result<Message> {
        self.analyze(session).await?;

        let mut latest = self.write(session).await?;
        if latest.is_error() {
            return Ok(latest);
        }

        if let Some(diagram) = options.diagram {
            latest = self.annotate(session, diagram).await?;
        }

        for (round, feedback) in options.feedback.iter().enumerate() {
            info!("Feedback round {}/{}", round + 1, options.feedback.len());
            latest = self.revise(session, feedback).await?;
            if latest.is_error() {
                warn!("Feedback round {} was refused", round + 1);
                return Ok(latest);
            }
        }

        Ok(latest)
    }
}
