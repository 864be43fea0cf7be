//! AI Integration Layer
//!
//! Provides the text-generation backend used by the writer, vision and
//! feedback agents.

pub mod generator;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use generator::TextGenerator;
pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    ErrorCategory, ErrorClassifier, GenerationRequest, ImageAttachment, LlmError, LlmProvider,
    LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
