use crate::campaign::Campaign;
use crate::store::JsonLog;
use crate::types::{CampaignError, Contact, DeliveryLogEntry, EmailSender, Result};
use chrono::{SecondsFormat, Utc};
use email_delivery::newsletter_payload;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The delivery log at `path`, with advice for when it is missing.
pub fn delivery_log(path: impl Into<PathBuf>) -> JsonLog<DeliveryLogEntry> {
    JsonLog::new(path).with_hint("Run a send via `campaign send` before analyzing.")
}

/// A contact left out of a bulk send, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedContact {
    pub email: String,
    pub persona: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    pub blog_title: String,
    pub delivered: Vec<DeliveryLogEntry>,
    pub skipped: Vec<SkippedContact>,
    /// Size of the delivery log after the write; `None` when nothing was written.
    pub log_size: Option<usize>,
}

/// Sends the newsletters of one campaign to contacts and records the results.
pub struct DeliveryOrchestrator {
    campaign: Campaign,
    sender: Arc<dyn EmailSender>,
    from_email: String,
    log: JsonLog<DeliveryLogEntry>,
}

impl DeliveryOrchestrator {
    /// Orchestrator sending `campaign` from `from_email` and recording into `log`.
    pub fn new(
        campaign: Campaign,
        sender: Arc<dyn EmailSender>,
        from_email: impl Into<String>,
        log: JsonLog<DeliveryLogEntry>,
    ) -> Self {
        Self {
            campaign,
            sender,
            from_email: from_email.into(),
            log,
        }
    }

    /// The campaign being delivered.
    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Deliver to one contact without touching the log.
    pub async fn deliver(&self, contact: &Contact) -> Result<DeliveryLogEntry> {
        if contact.persona.trim().is_empty() {
            return Err(CampaignError::MissingPersona {
                email: contact.email.clone(),
            });
        }

        let newsletter = self
            .campaign
            .newsletter_for(&contact.persona)
            .ok_or_else(|| CampaignError::UnknownPersona {
                persona: contact.persona.clone(),
                available: self.campaign.available_personas(),
            })?;

        if contact.email.trim().is_empty() {
            return Err(CampaignError::MissingEmail);
        }

        let blog_title = &self.campaign.blog_title;
        let payload = newsletter_payload(
            &self.from_email,
            &contact.email,
            &newsletter.draft,
            blog_title,
            &contact.persona,
        );

        debug!(
            "Sending '{}' to {} via {}",
            payload.subject,
            contact.email,
            self.sender.provider_name()
        );

        let response = self
            .sender
            .send(&payload)
            .await
            .map_err(CampaignError::Transport)?;

        if !response.is_accepted() {
            return Err(CampaignError::DeliveryRejected {
                status: response.status,
                body: response.body,
            });
        }

        let entry = DeliveryLogEntry {
            email: contact.email.clone(),
            persona: contact.persona.clone(),
            newsletter_id: newsletter.newsletter_id.clone(),
            blog_title: Some(blog_title.clone()),
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            provider: self.sender.provider_name(),
            resend_id: response.delivery_id(),
        };

        info!(
            "Sent '{}' to {} ({})",
            entry.newsletter_id, entry.email, entry.persona
        );
        Ok(entry)
    }

    /// Single-contact mode: every error is returned, and a successful
    /// delivery is written to the log straight away.
    pub async fn send_to_contact(&self, contact: &Contact) -> Result<DeliveryLogEntry> {
        let entry = self.deliver(contact).await?;
        let total = self.log.append(std::slice::from_ref(&entry)).await?;
        info!(
            "Logged delivery to {} ({} entries)",
            self.log.path().display(),
            total
        );
        Ok(entry)
    }

    /// Send to every contact in order.
    ///
    /// Contact validation failures are skipped with a warning. Anything else
    /// aborts the batch and nothing is logged. Successful deliveries are
    /// appended in one write at the end, and only if there was at least one.
    pub async fn orchestrate_bulk(&self, contacts: &[Contact]) -> Result<BulkReport> {
        let mut delivered = Vec::new();
        let mut skipped = Vec::new();

        for contact in contacts {
            match self.deliver(contact).await {
                Ok(entry) => delivered.push(entry),
                Err(e) if e.is_contact_validation() => {
                    warn!("Skipping {} ({}): {}", contact.email, contact.persona, e);
                    skipped.push(SkippedContact {
                        email: contact.email.clone(),
                        persona: contact.persona.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let log_size = if delivered.is_empty() {
            warn!("No deliveries succeeded; {} left untouched", self.log.path().display());
            None
        } else {
            let total = self.log.append(&delivered).await?;
            info!(
                "Logged {} deliveries to {} ({} entries)",
                delivered.len(),
                self.log.path().display(),
                total
            );
            Some(total)
        };

        Ok(BulkReport {
            blog_title: self.campaign.blog_title.clone(),
            delivered,
            skipped,
            log_size,
        })
    }
}
