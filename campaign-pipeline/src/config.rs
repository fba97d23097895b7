use crate::types::{CampaignError, Result};
use email_delivery::ResendConfig;
use std::path::{Path, PathBuf};
use url::Url;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const OPENAI_SUMMARY_MODEL_VAR: &str = "OPENAI_SUMMARY_MODEL";
pub const DATA_DIR_VAR: &str = "CAMPAIGN_DATA_DIR";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CONTENT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";

pub const CONTENT_LOG_FILE: &str = "generated_content.json";
pub const CONTACTS_FILE: &str = "contacts.json";
pub const DELIVERY_LOG_FILE: &str = "campaign_log.json";
pub const PERFORMANCE_FILE: &str = "performance_log.json";

/// Locations of the four flat files the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub content_log: PathBuf,
    pub contacts: PathBuf,
    pub delivery_log: PathBuf,
    pub performance: PathBuf,
}

impl DataPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            content_log: dir.join(CONTENT_LOG_FILE),
            contacts: dir.join(CONTACTS_FILE),
            delivery_log: dir.join(DELIVERY_LOG_FILE),
            performance: dir.join(PERFORMANCE_FILE),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub summary_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub summary_max_tokens: u32,
    /// No timeout unless set.
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("summary_model", &self.summary_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl GenerationConfig {
    /// Defaults for everything but the key. A blank key is missing configuration.
    pub fn new(api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CampaignError::ConfigurationMissing {
                name: OPENAI_API_KEY_VAR.to_string(),
            });
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_CONTENT_MODEL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1200,
            summary_max_tokens: 200,
            timeout_seconds: None,
        })
    }

    /// Read the OpenAI settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(&lookup(OPENAI_API_KEY_VAR).unwrap_or_default())?;

        if let Some(base_url) = non_empty(lookup(OPENAI_BASE_URL_VAR)) {
            config.base_url = validate_http_url(OPENAI_BASE_URL_VAR, &base_url)?;
        }
        if let Some(model) = non_empty(lookup(OPENAI_MODEL_VAR)) {
            config.model = model;
        }
        if let Some(model) = non_empty(lookup(OPENAI_SUMMARY_MODEL_VAR)) {
            config.summary_model = model;
        }

        Ok(config)
    }
}

/// Which collaborator settings a command needs. Anything not needed is not
/// read, so e.g. `overview` works without API keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigNeeds {
    pub generation: bool,
    pub delivery: bool,
}

/// Process-wide configuration, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub paths: DataPaths,
    pub generation: Option<GenerationConfig>,
    pub delivery: Option<ResendConfig>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env(needs: ConfigNeeds, data_dir: Option<PathBuf>) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), needs, data_dir)
    }

    /// Load through `lookup`. `data_dir` from the command line beats `CAMPAIGN_DATA_DIR`.
    pub fn from_lookup<F>(lookup: F, needs: ConfigNeeds, data_dir: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = data_dir
            .or_else(|| non_empty(lookup(DATA_DIR_VAR)).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let generation = if needs.generation {
            Some(GenerationConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        let delivery = if needs.delivery {
            Some(ResendConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        Ok(Self {
            paths: DataPaths::in_dir(&data_dir),
            data_dir,
            generation,
            delivery,
        })
    }

    /// Generation settings, or ConfigurationMissing if they were not loaded.
    pub fn generation(&self) -> Result<&GenerationConfig> {
        self.generation
            .as_ref()
            .ok_or_else(|| CampaignError::ConfigurationMissing {
                name: OPENAI_API_KEY_VAR.to_string(),
            })
    }

    /// Resend settings, or ConfigurationMissing if they were not loaded.
    pub fn delivery(&self) -> Result<&ResendConfig> {
        self.delivery
            .as_ref()
            .ok_or_else(|| CampaignError::ConfigurationMissing {
                name: email_delivery::resend_client::RESEND_API_KEY_VAR.to_string(),
            })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_http_url(name: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(value).map_err(|e| {
        CampaignError::InvalidConfiguration(format!("{} '{}': {}", name, value, e))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        scheme => Err(CampaignError::InvalidConfiguration(format!(
            "{} '{}': unsupported scheme '{}'",
            name, value, scheme
        ))),
    }
}
