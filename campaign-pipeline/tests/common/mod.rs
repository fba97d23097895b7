#![allow(dead_code)]

use campaign_pipeline::types::*;
use campaign_pipeline::{ContentStore, Result};
use std::path::Path;

pub const PERSONAS: [&str; 3] = [
    "Startup Founder",
    "Enterprise Marketing Director",
    "Freelance Creative Strategist",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn newsletter(persona: &str, subject: &str) -> NewsletterDraft {
    NewsletterDraft {
        persona: Some(persona.to_string()),
        angle: format!("Angle for {}", persona),
        subject_line: subject.to_string(),
        preview_text: format!("Preview for {}", persona),
        body: format!("Body copy for {}.", persona),
        newsletter_id: None,
    }
}

pub fn package(topic: &str, personas: &[&str]) -> ContentPackage {
    ContentPackage {
        topic: topic.to_string(),
        blog_outline: vec!["Why it matters".to_string(), "What to do next".to_string()],
        blog_draft: BlogDraft {
            word_goal: "400-600 words".to_string(),
            content: "A short draft.".to_string(),
        },
        newsletters: personas
            .iter()
            .enumerate()
            .map(|(i, persona)| newsletter(persona, &format!("Subject {}", i + 1)))
            .collect(),
        raw_output: None,
        error: None,
    }
}

/// A content log with one campaign covering the three standard personas.
pub async fn seed_campaign(path: &Path, topic: &str) -> Result<ContentStore> {
    let store = ContentStore::new(path);
    store.append(topic, &package(topic, &PERSONAS)).await?;
    Ok(store)
}

pub fn delivery(email: &str, persona: &str, blog: &str, sent_at: &str) -> DeliveryLogEntry {
    DeliveryLogEntry {
        email: email.to_string(),
        persona: persona.to_string(),
        newsletter_id: format!("{}-1", persona.to_lowercase().replace(' ', "-")),
        blog_title: Some(blog.to_string()),
        sent_at: sent_at.to_string(),
        provider: "resend".to_string(),
        resend_id: Some(format!("id-{}", email)),
    }
}
