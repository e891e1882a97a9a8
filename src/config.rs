//! Client configuration.
//!
//! There is no global configuration file. A host builds a [`ClientConfig`] directly or embeds it
//! in its own serde-deserialized settings.

use crate::request::REQUEST_ID_HEADER;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

const DEFAULT_WARMUP_PATH: &str = "/health";

/// Errors produced while loading a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid client config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("base_url must be an absolute http(s) URL, got {0:?}")]
    BaseUrl(String),
}

/// Settings for an [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://ai.example.org`. A trailing slash is ignored.
    pub base_url: String,
    /// Policy used by [`ApiClient::call`](crate::client::ApiClient::call) when none is given.
    #[serde(default)]
    pub default_policy: RetryPolicy,
    #[serde(default = "default_warmup_path")]
    pub warmup_path: String,
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

fn default_warmup_path() -> String {
    DEFAULT_WARMUP_PATH.to_string()
}

fn default_request_id_header() -> String {
    REQUEST_ID_HEADER.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_policy: RetryPolicy::default(),
            warmup_path: default_warmup_path(),
            request_id_header: default_request_id_header(),
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_default_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_warmup_path(mut self, path: impl Into<String>) -> Self {
        self.warmup_path = path.into();
        self
    }

    pub fn with_request_id_header(mut self, name: impl Into<String>) -> Self {
        self.request_id_header = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::BaseUrl(self.base_url.clone()))
        }
    }

    /// Join `path` onto the base URL with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn minimal_json_fills_defaults() {
        let config = ClientConfig::from_json(r#"{"baseUrl": "https://ai.example.org/"}"#).unwrap();
        assert_eq!(config.default_policy, RetryPolicy::default());
        assert_eq!(config.warmup_path, "/health");
        assert_eq!(config.request_id_header, "x-request-id");
        assert_eq!(config.url_for("/api/chat"), "https://ai.example.org/api/chat");
    }

    #[test]
    fn policy_fields_use_millisecond_names() {
        let config = ClientConfig::from_json(
            r#"{"baseUrl": "http://localhost:8000",
                "defaultPolicy": {"maxRetries": 1, "timeoutMs": 2500}}"#,
        )
        .unwrap();
        assert_eq!(config.default_policy.max_retries, 1);
        assert_eq!(config.default_policy.timeout, Duration::from_millis(2500));
        assert_eq!(config.default_policy.base_backoff, Duration::from_secs(1));
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = ClientConfig::from_json(r#"{"baseUrl": "ai.example.org"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::BaseUrl(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(ClientConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn url_for_handles_missing_slashes() {
        let config = ClientConfig::new("http://backend");
        assert_eq!(config.url_for("health"), "http://backend/health");
    }
}
