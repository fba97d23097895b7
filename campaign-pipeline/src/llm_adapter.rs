use crate::config::GenerationConfig;
use crate::types::{CampaignError, CompletionRequest, Result, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiAdapter {
    client: Client,
    config: GenerationConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiAdapter {
    /// Create an adapter for the configured endpoint and model.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent("campaign-pipeline/0.1");
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| CampaignError::General(format!("Failed to create HTTP client: {}", e)))?;

        info!("Using {} via {}", config.model, config.base_url);
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OpenAiAdapter {
    fn generator_name(&self) -> String {
        format!("OpenAI ({})", self.config.model)
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let body = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Requesting completion from {} with {}", self.endpoint(), model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("OpenAI API error ({}): {}", status.as_u16(), text);
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("OpenAI response contained no message content"))?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Failure(String),
}

/// Scripted LLM adapter for development and testing.
///
/// Replies are consumed in order; running out is reported as a failure.
pub struct MockLlmAdapter {
    name: String,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmAdapter {
    /// Create a mock with no scripted replies.
    pub fn new(name: String) -> Self {
        Self {
            name,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion.
    pub fn with_response(self, text: &str) -> Self {
        self.push(MockReply::Text(text.to_string()));
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: &str) -> Self {
        self.push(MockReply::Failure(message.to_string()));
        self
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn push(&self, reply: MockReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl TextGenerator for MockLlmAdapter {
    fn generator_name(&self) -> String {
        format!("Mock LLM Adapter ({})", self.name)
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| anyhow::anyhow!("mock adapter state poisoned"))?
            .pop_front();

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Err(anyhow::anyhow!(
                "Mock LLM adapter '{}' has no scripted replies left",
                self.name
            )),
        }
    }
}
