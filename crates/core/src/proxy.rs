//! Outbound Proxy
//!
//! Optional proxy for the Anthropic calls made by the AI gateway, read from
//! the `proxy` block of the server's JSON config file:
//!
//! ```json
//! { "proxy": { "protocol": "socks5", "host": "10.0.0.2", "port": 1080 } }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
}

impl ProxyProtocol {
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Accepted from the config file but never echoed back out.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL without credentials; the client attaches those separately.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("proxy host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("proxy port must be between 1 and 65535".to_string());
        }
        if self.password.is_some() && self.username.is_none() {
            return Err("proxy password given without a username".to_string());
        }
        Ok(())
    }
}
