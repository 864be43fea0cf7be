//! Gemini (Google AI) Provider
//!
//! LLM provider using the Generative Language `generateContent` endpoint.
//! Images travel as `inline_data` parts next to the prompt text.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, GenerationRequest, LlmProvider, LlmResponse, ProviderConfig,
    ResponseMetadata, ResponseTiming, TokenUsage, status_error,
};
use crate::types::{CraftError, ErrorCategory, LlmError, Result};

const PROVIDER: &str = "gemini";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API Provider with secure API key handling
pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                CraftError::Config(
                    "Gemini API key not found. Set GOOGLE_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CraftError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, request: &GenerationRequest<'_>) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.to_string(),
        }];
        if let Some(image) = request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.to_string(),
                    data: image.to_base64(),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.api_base, self.model, method)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse> {
        info!(
            "Generating with Gemini (model: {}, image: {})",
            self.model,
            request.image.is_some()
        );

        let start_time = Instant::now();
        let body = self.build_request(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            return Err(status_error(response, PROVIDER).await);
        }

        let response_body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let usage = response_body
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let text: String = response_body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::ParseError,
                "No text in Gemini response",
                PROVIDER,
            )
            .into());
        }

        Ok(LlmResponse {
            content: text,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1beta/models/{}", self.api_base, self.model);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Gemini API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Gemini API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Gemini API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ImageAttachment;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(api_base: &str) -> GeminiProvider {
        GeminiProvider::new(ProviderConfig {
            provider: "gemini".to_string(),
            api_key: Some("test-key".to_string()),
            api_base: Some(api_base.to_string()),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_with_image() {
        let provider = provider("http://localhost");
        let image = ImageAttachment::new("image/png", vec![1, 2, 3]);
        let body = provider.build_request(&GenerationRequest::with_image("describe", &image));
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
        assert!(value["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = provider("http://localhost");
        assert!(!format!("{:?}", provider).contains("test-key"));
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "# Title"}, {"text": "\nBody"}]}}],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
            })))
            .mount(&server)
            .await;

        let response = provider(&server.uri())
            .generate(&GenerationRequest::text("write"))
            .await
            .unwrap();
        assert_eq!(response.content, "# Title\nBody");
        assert_eq!(response.usage.total(), 16);
    }

    #[tokio::test]
    async fn test_generate_classifies_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .generate(&GenerationRequest::text("write"))
            .await
            .unwrap_err();
        match err {
            CraftError::Llm(e) => assert_eq!(e.category, ErrorCategory::RateLimit),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
