//! Text-Generation Client
//!
//! Single entry point the agents use to reach the backend. Every call is
//! bounded by the configured timeout, and a failed call never surfaces as an
//! `Err`: the caller receives a visible failure-marker string instead so the
//! pipeline can keep going with degraded content.

use std::fmt::Display;
use std::time::Duration;

use tracing::{debug, warn};

use super::provider::{GenerationRequest, ImageAttachment, SharedProvider};
use super::timeout::with_timeout;
use crate::constants::generation::FAILURE_MARKER;
use crate::types::Result;

/// Timeout-bounded wrapper around a shared provider
#[derive(Clone)]
pub struct TextGenerator {
    provider: SharedProvider,
    timeout: Duration,
}

impl std::fmt::Debug for TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TextGenerator {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Generate text for a prompt, or the failure marker
    pub async fn complete(&self, prompt: &str) -> String {
        self.run(GenerationRequest::text(prompt)).await
    }

    /// Generate text for a prompt plus an image, or the failure marker
    pub async fn complete_with_image(&self, prompt: &str, image: &ImageAttachment) -> String {
        self.run(GenerationRequest::with_image(prompt, image)).await
    }

    /// Text substituted for a failed generation
    pub fn failure_text(source: &str, error: impl Display) -> String {
        format!("{} {}: {}", FAILURE_MARKER, source, error)
    }

    /// Whether `text` is a substituted failure rather than generated content
    pub fn is_failure(text: &str) -> bool {
        text.starts_with(FAILURE_MARKER)
    }

    async fn run(&self, request: GenerationRequest<'_>) -> String {
        match self.try_generate(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation via {} failed: {}", self.provider.name(), e);
                Self::failure_text(self.provider.name(), e)
            }
        }
    }

    async fn try_generate(&self, request: GenerationRequest<'_>) -> Result<String> {
        let operation = format!("{} generation", self.provider.name());
        let response = with_timeout(self.timeout, self.provider.generate(&request), &operation).await?;

        debug!(
            "Generated {} chars via {}/{} ({} tokens, {}ms)",
            response.content.len(),
            response.metadata.provider,
            response.metadata.model,
            response.usage.total(),
            response.timing.total_ms
        );

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::stub::StubProvider;

    #[tokio::test]
    async fn test_complete_trims_output() {
        let stub = StubProvider::replying("  # Title\n\n");
        let generator = TextGenerator::new(stub.shared(), Duration::from_secs(1));

        assert_eq!(generator.complete("write").await, "# Title");
        assert_eq!(stub.last_prompt().as_deref(), Some("write"));
    }

    #[tokio::test]
    async fn test_failure_becomes_marker() {
        let stub = StubProvider::failing("quota exhausted");
        let generator = TextGenerator::new(stub.shared(), Duration::from_secs(1));

        let text = generator.complete("write").await;
        assert!(TextGenerator::is_failure(&text));
        assert!(text.starts_with("[generation failed] stub: "));
        assert!(text.contains("quota exhausted"));
    }

    #[tokio::test]
    async fn test_image_is_forwarded() {
        let stub = StubProvider::replying("diagram text");
        let generator = TextGenerator::new(stub.shared(), Duration::from_secs(1));
        let image = ImageAttachment::new("image/png", vec![1]);

        generator.complete_with_image("describe", &image).await;
        assert_eq!(stub.calls()[0].image_mime, Some("image/png"));
    }
}
