//! AI Gateway
//!
//! Stateless proxy between the service and the LLM provider. Sends one
//! prompt with a caller-chosen system instruction and returns the reply
//! parsed as JSON. Shape validation is the caller's job.

use std::sync::Arc;

use serde_json::Value;

use noviq_llm::{AnthropicProvider, LlmProvider, Message};

use crate::models::settings::ServerConfig;
use crate::utils::error::{AppError, AppResult};

/// Response budget class. Each tier is bound to its own model and token limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTier {
    /// Feedback, questions and the generic completion proxy
    Brief,
    /// Final analysis
    Extended,
}

#[derive(Clone)]
pub struct AiGateway {
    brief: Arc<dyn LlmProvider>,
    extended: Arc<dyn LlmProvider>,
}

impl AiGateway {
    pub fn new(brief: Arc<dyn LlmProvider>, extended: Arc<dyn LlmProvider>) -> Self {
        Self { brief, extended }
    }

    /// Build Anthropic providers for both tiers.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let brief = AnthropicProvider::new(config.provider_config(&config.brief))
            .map_err(|e| AppError::config(e.to_string()))?;
        let extended = AnthropicProvider::new(config.provider_config(&config.extended))
            .map_err(|e| AppError::config(e.to_string()))?;
        Ok(Self::new(Arc::new(brief), Arc::new(extended)))
    }

    fn provider(&self, tier: ResponseTier) -> &dyn LlmProvider {
        match tier {
            ResponseTier::Brief => self.brief.as_ref(),
            ResponseTier::Extended => self.extended.as_ref(),
        }
    }

    /// Send `user_prompt` under `system_instruction` and parse the reply.
    ///
    /// No retry is attempted. Provider rejections surface as `Upstream`,
    /// unparseable replies as `MalformedResponse`, and network failures as
    /// `Transport`.
    pub async fn complete(
        &self,
        tier: ResponseTier,
        user_prompt: &str,
        system_instruction: &str,
    ) -> AppResult<Value> {
        if user_prompt.trim().is_empty() {
            return Err(AppError::validation("prompt must not be empty"));
        }

        let provider = self.provider(tier);
        tracing::info!(
            tier = ?tier,
            model = provider.model(),
            prompt_len = user_prompt.len(),
            "forwarding completion"
        );

        let response = provider
            .send_message(
                vec![Message::user(user_prompt)],
                Some(system_instruction.to_string()),
            )
            .await?;

        if response.is_truncated() {
            tracing::warn!(tier = ?tier, "completion hit max_tokens; reply may be cut off");
        }

        parse_structured(response.text()?)
    }

    /// Both tiers are configured and usable.
    pub async fn health_check(&self) -> AppResult<()> {
        self.brief.health_check().await?;
        self.extended.health_check().await?;
        Ok(())
    }
}

/// Parse a model reply as JSON, tolerating surrounding whitespace and a
/// markdown code fence.
pub fn parse_structured(text: &str) -> AppResult<Value> {
    let trimmed = text.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed);
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(reply_len = text.len(), error = %e, "model reply is not valid JSON");
        AppError::malformed(format!("model reply is not valid JSON: {}", e))
    })
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("```")?.strip_suffix("```")?;
    // a language tag is a bare word alone on the opening line
    let body = match inner.split_once('\n') {
        Some((tag, rest)) if is_fence_tag(tag) => rest,
        _ => inner,
    };
    Some(body.trim())
}

fn is_fence_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}
