use email_delivery::ConfigError;
use std::path::PathBuf;

pub use interfaces::defs::{
    BlogDraft, CompletionRequest, Contact, ContentLogEntry, ContentPackage, DeliveryLogEntry,
    EmailPayload, EmailSender, NewsletterDraft, SendResponse, TextGenerator,
};

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("{name} is required. Set it in the environment before running this command.")]
    ConfigurationMissing { name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{} not found. {hint}", path.display())]
    NotFound { path: PathBuf, hint: String },

    #[error("{} is empty. {hint}", path.display())]
    EmptyLog { path: PathBuf, hint: String },

    #[error("{} is not a valid JSON log: {source}", path.display())]
    CorruptLog {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Contact is missing a persona.")]
    MissingPersona { email: String },

    #[error("Contact is missing an email address.")]
    MissingEmail,

    #[error("No newsletter prepared for persona '{persona}'. Available personas: {}", available.join(", "))]
    UnknownPersona {
        persona: String,
        available: Vec<String>,
    },

    #[error("Resend error ({status}): {body}")]
    DeliveryRejected { status: u16, body: String },

    #[error("Transport failure: {0:#}")]
    Transport(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

impl CampaignError {
    /// Per-contact validation failures. Bulk sends skip these and move on.
    pub fn is_contact_validation(&self) -> bool {
        matches!(
            self,
            CampaignError::MissingPersona { .. }
                | CampaignError::MissingEmail
                | CampaignError::UnknownPersona { .. }
        )
    }
}

impl From<ConfigError> for CampaignError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Missing { name } => CampaignError::ConfigurationMissing {
                name: name.to_string(),
            },
            other => CampaignError::InvalidConfiguration(other.to_string()),
        }
    }
}

/// Failure of a text-generation call whose result is optional to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Transport(String),

    #[error("the model returned an empty completion")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, CampaignError>;
