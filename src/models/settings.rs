//! Settings Models
//!
//! Server configuration: listen address, storage location, LLM credentials and
//! the per-tier model settings.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use noviq_core::ProxyConfig;
use noviq_llm::ProviderConfig;

pub const ENV_API_KEY: &str = "CLAUDE_KEY";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND: &str = "NOVIQ_BIND";
pub const ENV_LLM_BASE_URL: &str = "NOVIQ_LLM_BASE_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "NOVIQ_REQUEST_TIMEOUT_SECS";

/// Model identity and response budget for one response tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl StageSettings {
    /// Feedback, questions and the stage-agnostic proxy
    pub fn brief() -> Self {
        Self {
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 1024,
        }
    }

    /// Final analysis
    pub fn extended() -> Self {
        Self {
            model: "claude-3-sonnet-20240229".to_string(),
            max_tokens: 4000,
        }
    }
}

/// Service configuration stored in config.json, overridden by environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// SQLite file path, `sqlite://<path>`, or `:memory:`
    #[serde(default)]
    pub database_url: Option<String>,
    /// LLM API key; only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
    /// LLM endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,
    /// Transport timeout for LLM calls
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "StageSettings::brief")]
    pub brief: StageSettings,
    #[serde(default = "StageSettings::extended")]
    pub extended: StageSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database_url: None,
            api_key: None,
            llm_base_url: None,
            request_timeout_secs: default_timeout(),
            brief: StageSettings::brief(),
            extended: StageSettings::extended(),
            proxy: None,
        }
    }
}

impl ServerConfig {
    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(base) = lookup(ENV_LLM_BASE_URL) {
            self.llm_base_url = Some(base);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a whole number of seconds, got '{}'", ENV_REQUEST_TIMEOUT, raw))?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(format!("{} is not set", ENV_API_KEY));
        }

        if self
            .database_url
            .as_deref()
            .map_or(true, |u| u.trim().is_empty())
        {
            return Err(format!("{} is not set", ENV_DATABASE_URL));
        }

        self.bind_addr()?;

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".to_string());
        }

        for (tier, stage) in [("brief", &self.brief), ("extended", &self.extended)] {
            if stage.model.trim().is_empty() {
                return Err(format!("{} model must not be empty", tier));
            }
            if stage.max_tokens == 0 {
                return Err(format!("{} max_tokens must be at least 1", tier));
            }
        }

        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        self.bind
            .parse()
            .map_err(|_| format!("Invalid bind address: {}", self.bind))
    }

    /// Provider settings for one tier
    pub fn provider_config(&self, stage: &StageSettings) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            base_url: self.llm_base_url.clone(),
            model: stage.model.clone(),
            max_tokens: stage.max_tokens,
            temperature: None,
            proxy: self.proxy.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.brief.model, "claude-3-haiku-20240307");
        assert_eq!(config.brief.max_tokens, 1024);
        assert_eq!(config.extended.model, "claude-3-sonnet-20240229");
        assert_eq!(config.extended.max_tokens, 4000);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_missing_required_settings() {
        let config = ServerConfig::default();
        assert_eq!(config.validate().unwrap_err(), "CLAUDE_KEY is not set");

        let mut config = ServerConfig::default();
        config.apply_env(env(&[("CLAUDE_KEY", "sk-test")])).unwrap();
        assert_eq!(config.validate().unwrap_err(), "DATABASE_URL is not set");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[
                ("CLAUDE_KEY", "sk-test"),
                ("DATABASE_URL", ":memory:"),
                ("NOVIQ_BIND", "0.0.0.0:8080"),
                ("NOVIQ_LLM_BASE_URL", "http://127.0.0.1:9999/v1/messages"),
                ("NOVIQ_REQUEST_TIMEOUT_SECS", "30"),
            ]))
            .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr().unwrap().port(), 8080);

        let provider = config.provider_config(&config.extended);
        assert_eq!(provider.model, "claude-3-sonnet-20240229");
        assert_eq!(provider.max_tokens, 4000);
        assert_eq!(provider.timeout_secs, 30);
        assert_eq!(
            provider.base_url.as_deref(),
            Some("http://127.0.0.1:9999/v1/messages")
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ServerConfig::default();
        assert!(config
            .apply_env(env(&[("NOVIQ_REQUEST_TIMEOUT_SECS", "soon")]))
            .is_err());

        config
            .apply_env(env(&[
                ("CLAUDE_KEY", "k"),
                ("DATABASE_URL", "noviq.db"),
                ("NOVIQ_BIND", "localhost"),
            ]))
            .unwrap();
        assert!(config.validate().unwrap_err().contains("Invalid bind address"));
    }

    #[test]
    fn test_api_key_not_read_from_file() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"api_key":"leak","bind":"127.0.0.1:4000"}"#).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.bind, "127.0.0.1:4000");
        assert!(!serde_json::to_string(&config).unwrap().contains("api_key"));
    }
}
