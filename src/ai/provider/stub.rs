//! In-memory provider for tests: records every call and replies with a
//! fixed text or a fixed failure.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{GenerationRequest, LlmProvider, LlmResponse, SharedProvider};
use crate::types::{ErrorCategory, LlmError, Result};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub prompt: String,
    pub image_mime: Option<&'static str>,
}

#[derive(Debug)]
pub(crate) struct StubProvider {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn shared(self: &Arc<Self>) -> SharedProvider {
        self.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: request.prompt.to_string(),
            image_mime: request.image.map(|i| i.mime_type),
        });
        match &self.reply {
            Ok(text) => Ok(LlmResponse::content_only(text.clone())),
            Err(message) => {
                Err(LlmError::with_provider(ErrorCategory::Unavailable, message.clone(), "stub").into())
            }
        }
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
