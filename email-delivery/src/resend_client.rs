use anyhow::Result;
use async_trait::async_trait;
use interfaces::defs::{EmailPayload, EmailSender, SendResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const RESEND_API_KEY_VAR: &str = "RESEND_API_KEY";
pub const RESEND_FROM_EMAIL_VAR: &str = "RESEND_FROM_EMAIL";
pub const RESEND_API_URL_VAR: &str = "RESEND_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required.")]
    Missing { name: &'static str },

    #[error("Invalid URL for {name} '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from_email: String,
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"***")
            .field("from_email", &self.from_email)
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ResendConfig {
    /// Configuration with the default endpoint and timeout. Both values are required.
    pub fn new(api_key: &str, from_email: &str) -> std::result::Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing { name: RESEND_API_KEY_VAR });
        }
        if from_email.trim().is_empty() {
            return Err(ConfigError::Missing { name: RESEND_FROM_EMAIL_VAR });
        }

        Ok(Self {
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            api_url: RESEND_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        })
    }

    /// Load from the process environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(RESEND_API_KEY_VAR).unwrap_or_default();
        let from_email = lookup(RESEND_FROM_EMAIL_VAR).unwrap_or_default();
        let config = Self::new(&api_key, &from_email)?;

        match lookup(RESEND_API_URL_VAR).filter(|value| !value.trim().is_empty()) {
            Some(api_url) => config.with_api_url(&api_url),
            None => Ok(config),
        }
    }

    /// Override the endpoint. Only http and https URLs are accepted.
    pub fn with_api_url(mut self, api_url: &str) -> std::result::Result<Self, ConfigError> {
        let parsed = Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl {
            name: RESEND_API_URL_VAR,
            value: api_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                name: RESEND_API_URL_VAR,
                value: api_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        self.api_url = api_url.to_string();
        Ok(self)
    }

    /// Override the request timeout in seconds.
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Delivery through the Resend `/emails` endpoint. One POST per call, no retry.
pub struct ResendClient {
    client: Client,
    config: ResendConfig,
}

impl ResendClient {
    /// Create a client with the configured timeout.
    pub fn new(config: ResendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    /// Sender address used for every message.
    pub fn from_email(&self) -> &str {
        &self.config.from_email
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ResendConfig {
        &self.config
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    fn provider_name(&self) -> String {
        "resend".to_string()
    }

    async fn send(&self, payload: &EmailPayload) -> Result<SendResponse> {
        debug!(
            "POST {} to={:?} subject={:?}",
            self.config.api_url, payload.to, payload.subject
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Resend request failed: {}", e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read Resend response: {}", e))?;

        debug!("Resend answered {} ({} bytes)", status, body.len());
        Ok(SendResponse { status, body })
    }
}
