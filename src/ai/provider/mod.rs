//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for free-text generation, optionally with a
//! single image attachment for multimodal models.
//!
//! ## Providers
//!
//! - `gemini`: Google Generative Language API (default)
//! - `openai`: OpenAI Chat Completions API
//! - `ollama`: locally-running Ollama server

mod gemini;
mod ollama;
mod openai;
#[cfg(test)]
pub(crate) mod stub;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{CraftError, Result};

// =============================================================================
// Requests
// =============================================================================

/// Image sent alongside a prompt
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(mime_type: &'static str, data: Vec<u8>) -> Self {
        Self { mime_type, data }
    }

    /// Standard base64 of the raw bytes
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// `data:` URL form used by OpenAI-compatible APIs
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A single generation call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub image: Option<&'a ImageAttachment>,
}

impl<'a> GenerationRequest<'a> {
    pub fn text(prompt: &'a str) -> Self {
        Self {
            prompt,
            image: None,
        }
    }

    pub fn with_image(prompt: &'a str, image: &'a ImageAttachment) -> Self {
        Self {
            prompt,
            image: Some(image),
        }
    }
}

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type passed to every generating agent.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output. Each
/// provider converts the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "gemini", "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation
    pub temperature: f32,
    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from_llm(&LlmConfig::default())
    }
}

impl ProviderConfig {
    /// Text-generation provider settings
    pub fn from_llm(llm: &LlmConfig) -> Self {
        Self {
            provider: llm.provider.clone(),
            model: Some(llm.model.clone()),
            timeout_secs: llm.timeout_secs,
            temperature: llm.temperature,
            api_key: None,
            api_base: llm.api_base.clone(),
            max_tokens: llm.max_tokens,
        }
    }

    /// Diagram-analysis provider settings (`vision_model` falls back to `model`)
    pub fn vision_from_llm(llm: &LlmConfig) -> Self {
        let mut config = Self::from_llm(llm);
        if let Some(model) = &llm.vision_model {
            config.model = Some(model.clone());
        }
        config
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for free-text generation with usage metrics
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a prompt, with an optional image
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(CraftError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, ollama",
            config.provider
        ))),
    }
}

/// Map a non-success provider response onto a classified error
pub(crate) async fn status_error(response: reqwest::Response, provider: &str) -> CraftError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ErrorClassifier::classify_http_status(
        status.as_u16(),
        &format!("API error ({}): {}", status, body),
        provider,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!serde_json::to_string(&config).unwrap().contains("sk-secret"));
    }

    #[test]
    fn test_vision_model_fallback() {
        let mut llm = LlmConfig::default();
        assert_eq!(
            ProviderConfig::vision_from_llm(&llm).model.as_deref(),
            Some("gemini-2.0-flash")
        );

        llm.vision_model = Some("gemini-2.5-flash".to_string());
        assert_eq!(
            ProviderConfig::vision_from_llm(&llm).model.as_deref(),
            Some("gemini-2.5-flash")
        );
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ProviderConfig {
            provider: "palm".to_string(),
            ..ProviderConfig::default()
        };
        assert!(matches!(create_provider(&config), Err(CraftError::Config(_))));
    }

    #[test]
    fn test_image_encodings() {
        let image = ImageAttachment::new("image/png", vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.to_base64(), "iVBORw==");
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
        assert!(format!("{:?}", image).contains("bytes: 4"));
    }
}
