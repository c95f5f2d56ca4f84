//! Noviq LLM
//!
//! Provider abstraction for the language model behind the AI Gateway:
//! - `LlmProvider` trait and HTTP error mapping
//! - Anthropic Messages API provider
//! - HTTP client factory with proxy and timeout support

pub mod anthropic;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use http_client::build_http_client;
pub use provider::LlmProvider;
pub use types::*;
