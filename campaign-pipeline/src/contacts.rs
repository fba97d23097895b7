use crate::types::{Contact, Result};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// One contact per standard persona, used when no contact list exists.
pub fn sample_contacts() -> Vec<Contact> {
    vec![
        Contact::new("founder@example.com", "Alex", "Rivera", "Startup Founder"),
        Contact::new(
            "director@example.com",
            "Morgan",
            "Lee",
            "Enterprise Marketing Director",
        ),
        Contact::new(
            "creative@example.com",
            "Jamie",
            "Chen",
            "Freelance Creative Strategist",
        ),
    ]
}

/// Contacts from `path`, or the built-in samples when the file is absent or
/// is not a JSON list or object.
pub async fn load_contacts(path: &Path) -> Result<Vec<Contact>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("{} not found; using sample contacts", path.display());
            return Ok(sample_contacts());
        }
        Err(e) => return Err(e.into()),
    };

    match parse_contacts(&raw) {
        Some(contacts) => Ok(contacts),
        None => {
            warn!(
                "{} is empty or invalid JSON. Falling back to sample contacts.",
                path.display()
            );
            Ok(sample_contacts())
        }
    }
}

/// `None` only when `raw` is not JSON or is neither a list nor an object.
/// List items that are not contact records are dropped with a warning; a
/// record with blank fields is kept so delivery can report it.
fn parse_contacts(raw: &str) -> Option<Vec<Contact>> {
    let items = match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => return None,
    };

    let contacts = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Contact>(item) {
            Ok(contact) => Some(contact),
            Err(e) => {
                warn!("Ignoring contact #{}: {}", index + 1, e);
                None
            }
        })
        .collect();
    Some(contacts)
}
