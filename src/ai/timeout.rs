//! Timeout helpers for external calls
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let text = with_timeout(
//!     Duration::from_secs(300),
//!     async { provider.generate(&request).await },
//!     "gemini generation",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::constants::network as net_constants;
use crate::types::{CraftError, Result};

/// Timeouts applied by the pipeline
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for generation requests (default: 5 minutes)
    pub llm_request: Duration,
    /// Timeout for hosting API requests (default: 30 seconds)
    pub hosting_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            hosting_request: Duration::from_secs(net_constants::HOSTING_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn with_llm_secs(secs: u64) -> Self {
        Self {
            llm_request: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(CraftError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.llm_request.as_secs(), 300);
        assert_eq!(config.hosting_request.as_secs(), 30);

        let config = TimeoutConfig::with_llm_secs(5);
        assert_eq!(config.llm_request.as_secs(), 5);
        assert_eq!(config.hosting_request.as_secs(), 30);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, CraftError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, CraftError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), CraftError::Timeout { .. }));
    }
}
