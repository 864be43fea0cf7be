//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Taxonomy
//!
//! - **Acquisition** (`Fetch`, `Image`, `Io`): source tree or diagram could not
//!   be obtained. Fatal to the step that needed it.
//! - **Generation** (`Llm`, `LlmApi`, `Timeout`): the backend failed. Steps
//!   degrade to a visible failure marker instead of propagating these.
//! - **Contract** (`Contract`): a step received the wrong message kind.
//! - **Step** (`StepFailed`): a step answered with an error envelope or a
//!   failed status; raised by the driver, never by the agents.
//! - **Publish** (`Http`, `Transport`): hosting API returned a non-2xx status
//!   or the request never completed.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used to describe backend failures to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Authentication failed (missing or invalid key)
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider or model unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Provider response could not be parsed
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether re-running the same step later has a chance of succeeding.
    ///
    /// Nothing retries automatically; the CLI uses this to phrase its hint.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError
        )
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps provider failures onto an [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport-level failure from reqwest
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else if err.is_request() || err.is_body() {
            ErrorCategory::BadRequest
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CraftError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Acquisition Errors
    // -------------------------------------------------------------------------
    #[error("Failed to fetch repository '{reference}': {reason}")]
    Fetch { reference: String, reason: String },

    #[error("Image error: {0}")]
    Image(String),

    // -------------------------------------------------------------------------
    // Hosting API Errors
    // -------------------------------------------------------------------------
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("{step} expected {expected} but received '{actual}'")]
    Contract {
        step: String,
        expected: String,
        actual: String,
    },

    #[error("Session error: {0}")]
    Session(String),

    #[error("{step} failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl From<LlmError> for CraftError {
    fn from(err: LlmError) -> Self {
        CraftError::Llm(err)
    }
}

impl From<reqwest::Error> for CraftError {
    fn from(err: reqwest::Error) -> Self {
        CraftError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for CraftError {
    fn from(err: toml::de::Error) -> Self {
        CraftError::Toml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CraftError>;

impl CraftError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn fetch(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn step_failed(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StepFailed {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Whether the user can reasonably re-run the failed step as-is
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_retryable(),
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "slow down", "gemini");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(403, "bad key", "openai");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server = ErrorClassifier::classify_http_status(503, "overloaded", "ollama");
        assert_eq!(server.category, ErrorCategory::Transient);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "gemini");
        assert_eq!(err.to_string(), "[gemini:RATE_LIMIT] Too many requests");

        let bare = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(bare.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_contract_error_names_step() {
        let err = CraftError::Contract {
            step: "WriterAgent".to_string(),
            expected: "repository-summary".to_string(),
            actual: "draft-document".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "WriterAgent expected repository-summary but received 'draft-document'"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(CraftError::Http { status: 502, body: String::new() }.is_recoverable());
        assert!(!CraftError::Http { status: 409, body: String::new() }.is_recoverable());
        assert!(!CraftError::Config("x".into()).is_recoverable());
    }
}
