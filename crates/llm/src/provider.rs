//! LLM Provider Trait
//!
//! Defines the common interface for LLM providers.

use async_trait::async_trait;

use super::types::{LlmError, LlmResponse, LlmResult, Message, ProviderConfig};

/// Trait that all LLM providers must implement.
///
/// Completions are single request/response round trips; there is no
/// streaming and no retry at this layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send a conversation and wait for the complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation turns, usually a single user message
    /// * `system` - Optional system instruction
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> LlmResult<LlmResponse>;

    /// Check that the provider is configured to make calls.
    async fn health_check(&self) -> LlmResult<()>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Pull `error.message` out of a provider error body, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    let message = error_message(body);
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound { model: message },
        429 => LlmError::RateLimited {
            message,
            retry_after: None,
        },
        400 => LlmError::InvalidRequest { message },
        500..=599 => LlmError::ServerError {
            message,
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, message),
        },
    }
}
