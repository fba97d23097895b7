use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Field decoders for JSON written by hand or by a model. `null` reads as
/// the field's default and plain scalars are accepted where text is expected.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Text from a string, number or boolean; `null` is empty.
    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(String::new()),
            Value::String(text) => Ok(text),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(D::Error::custom(format!("expected text, found {}", other))),
        }
    }

    /// Like `text`, with empty and `null` read as `None`.
    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = text(deserializer)?;
        Ok(Some(text).filter(|text| !text.is_empty()))
    }

    /// `null` reads as `T::default()`.
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Delivery persona; absent or `null` groups as `Unknown`.
    pub fn persona<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(super::unknown_persona()),
            Some(value) => text(value).map_err(D::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogDraft {
    /// Free text such as "400-600 words"; a bare number is kept as its digits.
    #[serde(default, deserialize_with = "lenient::text")]
    pub word_goal: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
}

/// Newsletter copy tailored to one persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterDraft {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub persona: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub angle: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subject_line: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub preview_text: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub body: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub newsletter_id: Option<String>,
}

/// Outline, draft and persona newsletters produced for a single topic.
///
/// A package that failed to generate still carries its topic, plus an
/// `error` and (when the model answered at all) the `raw_output`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPackage {
    #[serde(default, deserialize_with = "lenient::text")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub blog_outline: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub blog_draft: BlogDraft,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub newsletters: Vec<NewsletterDraft>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_output: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl ContentPackage {
    /// A package that carries only its topic and what went wrong.
    pub fn failed(topic: &str, error: impl Into<String>, raw_output: Option<String>) -> Self {
        Self {
            topic: topic.to_string(),
            error: Some(error.into()),
            raw_output,
            ..Default::default()
        }
    }

    /// Whether generation failed for this package.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One row of the content log.
///
/// Older logs stored bare packages without the timestamp wrapper. An object
/// with a `content_package` key is always read as the wrapped form, so a
/// broken wrapped entry is an error rather than a bare package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentLogEntry {
    pub timestamp: String,
    pub topic: String,
    pub content_package: ContentPackage,
}

#[derive(Deserialize)]
struct WrappedLogEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    timestamp: String,
    #[serde(default, deserialize_with = "lenient::text")]
    topic: String,
    content_package: ContentPackage,
}

impl<'de> Deserialize<'de> for ContentLogEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        if value.get("content_package").is_some() {
            let entry: WrappedLogEntry = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("invalid content log entry: {}", e)))?;
            return Ok(Self {
                timestamp: entry.timestamp,
                topic: entry.topic,
                content_package: entry.content_package,
            });
        }

        let content_package: ContentPackage = serde_json::from_value(value)
            .map_err(|e| D::Error::custom(format!("invalid content package: {}", e)))?;
        Ok(Self {
            timestamp: String::new(),
            topic: content_package.topic.clone(),
            content_package,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub persona: String,
}

impl Contact {
    pub fn new(email: &str, first_name: &str, last_name: &str, persona: &str) -> Self {
        Self {
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            persona: persona.to_owned(),
        }
    }
}

fn unknown_persona() -> String {
    "Unknown".to_owned()
}

/// A single accepted delivery, as recorded in the delivery log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLogEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default = "unknown_persona", deserialize_with = "lenient::persona")]
    pub persona: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub newsletter_id: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub blog_title: Option<String>,
    /// Empty when the sender did not record a usable time.
    #[serde(default, deserialize_with = "lenient::text")]
    pub sent_at: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub provider: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub resend_id: Option<String>,
}

// Collaborator note:
// The text-generation and email-delivery services are opaque to the pipeline.
// Implementations are expected to make exactly one attempt per call; retries,
// if any, belong to the caller.

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    /// Overrides the generator's default model when set.
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Request with no temperature, no model override and 1200 max tokens.
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: None,
            max_tokens: 1200,
            model: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the generator's default model; `None` keeps it.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Text-generation collaborator: one prompt in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn generator_name(&self) -> String;

    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPayload {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub tags: Vec<EmailTag>,
}

/// Raw outcome of a delivery call. Non-success statuses are not errors at
/// this level; the caller decides what counts as accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResponse {
    pub status: u16,
    pub body: String,
}

impl SendResponse {
    /// Resend accepts a message with 200 or 202.
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 202)
    }

    /// Provider-assigned id from a JSON body of the form `{"id": "..."}`.
    pub fn delivery_id(&self) -> Option<String> {
        let body: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        body.get("id")?.as_str().map(str::to_owned)
    }
}

/// Email-delivery collaborator.
#[async_trait]
pub trait EmailSender: Send + Sync {
    fn provider_name(&self) -> String;

    async fn send(&self, payload: &EmailPayload) -> Result<SendResponse>;
}
