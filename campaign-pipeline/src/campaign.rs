use crate::content_store::ContentStore;
use crate::types::{ContentLogEntry, NewsletterDraft, Result};
use indexmap::IndexMap;
use tracing::debug;

pub const UNTITLED_CAMPAIGN: &str = "Untitled Campaign";

/// A newsletter draft resolved for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaNewsletter {
    /// Persona label as written in the draft (or its positional fallback).
    pub persona: String,
    pub newsletter_id: String,
    pub draft: NewsletterDraft,
}

/// Lower-cased persona name -> newsletter, in draft order.
pub type PersonaNewsletterMap = IndexMap<String, PersonaNewsletter>;

#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub blog_title: String,
    pub newsletters: PersonaNewsletterMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignOverview {
    pub blog_title: String,
    pub personas: Vec<String>,
}

/// Lookup key for a persona: the name lower-cased.
pub fn normalize_persona(persona: &str) -> String {
    persona.to_lowercase()
}

/// `{lower-cased persona with spaces as '-'}-{position}`; position is 1-based.
pub fn newsletter_id_for(persona: &str, position: usize) -> String {
    format!("{}-{}", normalize_persona(persona).replace(' ', "-"), position)
}

impl Campaign {
    /// Build the persona lookup from a content-log entry.
    ///
    /// Two drafts whose personas normalize to the same key collide; the later
    /// one replaces the earlier one.
    pub fn from_entry(entry: &ContentLogEntry) -> Self {
        let package = &entry.content_package;
        let blog_title = [package.topic.as_str(), entry.topic.as_str()]
            .into_iter()
            .find(|topic| !topic.is_empty())
            .unwrap_or(UNTITLED_CAMPAIGN)
            .to_string();

        let mut newsletters = PersonaNewsletterMap::new();
        for (index, draft) in package.newsletters.iter().enumerate() {
            let position = index + 1;
            let persona = draft
                .persona
                .clone()
                .unwrap_or_else(|| format!("Persona {}", position));
            let newsletter_id = draft
                .newsletter_id
                .clone()
                .unwrap_or_else(|| newsletter_id_for(&persona, position));

            let key = normalize_persona(&persona);
            if newsletters.contains_key(&key) {
                debug!("Newsletter #{} replaces an earlier draft for '{}'", position, key);
            }
            newsletters.insert(
                key,
                PersonaNewsletter {
                    persona,
                    newsletter_id,
                    draft: draft.clone(),
                },
            );
        }

        Self {
            blog_title,
            newsletters,
        }
    }

    /// Newsletter for `persona`, matched without regard to case.
    pub fn newsletter_for(&self, persona: &str) -> Option<&PersonaNewsletter> {
        self.newsletters.get(&normalize_persona(persona))
    }

    /// Persona labels in draft order, as shown to users.
    pub fn available_personas(&self) -> Vec<String> {
        self.newsletters
            .values()
            .map(|newsletter| newsletter.persona.clone())
            .collect()
    }

    /// Title and personas, for display.
    pub fn overview(&self) -> CampaignOverview {
        CampaignOverview {
            blog_title: self.blog_title.clone(),
            personas: self.available_personas(),
        }
    }
}

/// Reads the current campaign out of the content log. Nothing is cached;
/// every call rebuilds the map from disk.
#[derive(Debug, Clone)]
pub struct CampaignLoader {
    store: ContentStore,
}

impl CampaignLoader {
    /// Create a loader reading from `store`.
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Build the campaign from the newest content-log entry.
    pub async fn load_latest_campaign(&self) -> Result<Campaign> {
        let entry = self.store.load_latest().await?;
        let campaign = Campaign::from_entry(&entry);
        debug!(
            "Loaded campaign '{}' with {} persona newsletters",
            campaign.blog_title,
            campaign.newsletters.len()
        );
        Ok(campaign)
    }

    /// Overview of the newest campaign.
    pub async fn overview(&self) -> Result<CampaignOverview> {
        Ok(self.load_latest_campaign().await?.overview())
    }
}
