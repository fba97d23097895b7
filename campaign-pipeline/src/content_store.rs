use crate::store::JsonLog;
use crate::types::{ContentLogEntry, ContentPackage, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log of generated packages. The newest entry is the current campaign.
#[derive(Debug, Clone)]
pub struct ContentStore {
    log: JsonLog<ContentLogEntry>,
}

impl ContentStore {
    /// Store backed by the content log at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonLog::new(path).with_hint("Run `campaign generate` first."),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Append a package stamped with the local time. Returns the entry count.
    pub async fn append(&self, topic: &str, package: &ContentPackage) -> Result<usize> {
        let entry = ContentLogEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            topic: topic.to_string(),
            content_package: package.clone(),
        };

        let total = self.log.append(&[entry]).await?;
        info!("Content saved to {} ({} entries)", self.path().display(), total);
        Ok(total)
    }

    /// The current campaign entry. Fails with NotFound or EmptyLog.
    pub async fn load_latest(&self) -> Result<ContentLogEntry> {
        self.log.latest().await
    }

    /// Every entry, oldest first.
    pub async fn load_all(&self) -> Result<Vec<ContentLogEntry>> {
        self.log.read_all().await
    }
}
