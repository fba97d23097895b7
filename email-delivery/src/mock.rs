use anyhow::Result;
use async_trait::async_trait;
use interfaces::defs::{EmailPayload, EmailSender, SendResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
enum ScriptedReply {
    Respond { status: u16, body: String },
    TransportFailure(String),
}

/// In-memory sender for development and testing.
///
/// Accepts every message with a `202` and a generated id unless a reply has
/// been scripted for the recipient. Every payload it sees is recorded.
pub struct MockEmailSender {
    name: String,
    scripted: HashMap<String, ScriptedReply>,
    sent: Mutex<Vec<EmailPayload>>,
}

impl MockEmailSender {
    /// Create a mock reporting `name` as its provider.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripted: HashMap::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answer messages to `recipient` with `status` and `body`.
    pub fn with_reply_for(mut self, recipient: &str, status: u16, body: &str) -> Self {
        self.scripted.insert(
            recipient.to_string(),
            ScriptedReply::Respond {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Fail messages to `recipient` before any response.
    pub fn with_transport_failure_for(mut self, recipient: &str, message: &str) -> Self {
        self.scripted.insert(
            recipient.to_string(),
            ScriptedReply::TransportFailure(message.to_string()),
        );
        self
    }

    /// Payloads accepted for sending, oldest first.
    pub fn sent(&self) -> Vec<EmailPayload> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    fn provider_name(&self) -> String {
        self.name.clone()
    }

    async fn send(&self, payload: &EmailPayload) -> Result<SendResponse> {
        let recipient = payload.to.first().cloned().unwrap_or_default();
        debug!("Mock sender '{}' handling message to {}", self.name, recipient);

        if let Some(ScriptedReply::TransportFailure(message)) = self.scripted.get(&recipient) {
            return Err(anyhow::anyhow!("{}", message));
        }

        let sequence = {
            let mut sent = self
                .sent
                .lock()
                .map_err(|_| anyhow::anyhow!("mock sender state poisoned"))?;
            sent.push(payload.clone());
            sent.len()
        };

        match self.scripted.get(&recipient) {
            Some(ScriptedReply::Respond { status, body }) => Ok(SendResponse {
                status: *status,
                body: body.clone(),
            }),
            _ => Ok(SendResponse {
                status: 202,
                body: format!(r#"{{"id":"mock-{}"}}"#, sequence),
            }),
        }
    }
}
