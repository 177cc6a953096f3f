//! Immutable forwarding settings, built once at startup

use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::config::{BackendMode, Config};
use crate::error::GatewayError;

/// Which timeout budget a forwarded call gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    Standard,
    Batch,
}

/// Everything the forwarder needs, shared by reference across requests
#[derive(Debug, Clone)]
pub struct ProxySettings {
    base_url: String,
    api_key: Option<String>,
    user_agent: String,
    standard_timeout: Duration,
    batch_timeout: Duration,
    connect_timeout: Duration,
    max_response_bytes: usize,
    mode: BackendMode,
}

impl ProxySettings {
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let base_url = config.upstream.base_url.trim().to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| GatewayError::Config(format!("invalid upstream base_url {:?}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::Config(format!(
                "upstream base_url must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        let api_key = Some(config.upstream.api_key.trim().to_string()).filter(|k| !k.is_empty());
        if let Some(key) = &api_key {
            HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| GatewayError::Config("api_key contains characters not allowed in a header".into()))?;
        }
        HeaderValue::from_str(&config.upstream.user_agent)
            .map_err(|_| GatewayError::Config("user_agent contains characters not allowed in a header".into()))?;

        Ok(Self {
            base_url,
            api_key,
            user_agent: config.upstream.user_agent.clone(),
            standard_timeout: Duration::from_secs(config.timeouts.standard),
            batch_timeout: Duration::from_secs(config.timeouts.batch),
            connect_timeout: Duration::from_secs(config.timeouts.connect),
            max_response_bytes: config.upstream.max_response_bytes,
            mode: config.backend.mode,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    pub fn timeout(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Standard => self.standard_timeout,
            TimeoutClass::Batch => self.batch_timeout,
        }
    }

    /// User-Agent for a route group, e.g. `MiniUltiMaxConsole/1.0-API2`
    pub fn user_agent(&self, suffix: &str) -> String {
        format!("{}{}", self.user_agent, suffix)
    }

    /// Join the base URL and an upstream-relative path with exactly one slash
    pub fn upstream_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
