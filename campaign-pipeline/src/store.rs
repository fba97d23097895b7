use crate::types::{CampaignError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// An append-only log kept as a single pretty-printed JSON array.
///
/// There is no locking: every append reads the whole file, extends it in
/// memory and rewrites it. Two writers that `open` the same log and both
/// `commit` will lose the first writer's entries. The rewrite itself goes
/// through a temporary file and a rename, so a crash never leaves a
/// half-written file behind.
#[derive(Debug, Clone)]
pub struct JsonLog<T> {
    path: PathBuf,
    hint: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Log stored at `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hint: String::new(),
            _marker: PhantomData,
        }
    }

    /// Advice appended to NotFound/EmptyLog messages.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry, oldest first. A lone JSON object counts as a one-entry log.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CampaignError::NotFound {
                    path: self.path.clone(),
                    hint: self.hint.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&raw).map_err(|source| self.corrupt(source))?;
        let entries = into_entries(value).ok_or_else(|| {
            self.corrupt(serde::de::Error::custom("expected a JSON array or object"))
        })?;

        entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).map_err(|source| self.corrupt(source)))
            .collect()
    }

    /// Like `read_all`, but an empty log is an EmptyLog error.
    pub async fn read_non_empty(&self) -> Result<Vec<T>> {
        let entries = self.read_all().await?;
        if entries.is_empty() {
            return Err(self.empty());
        }
        Ok(entries)
    }

    /// The newest entry.
    pub async fn latest(&self) -> Result<T> {
        let mut entries = self.read_non_empty().await?;
        entries.pop().ok_or_else(|| self.empty())
    }

    /// Load the current contents for appending.
    ///
    /// A missing file starts an empty batch. So does an unparseable one,
    /// which means its old contents are dropped on the next commit.
    pub async fn open(&self) -> Result<LogBatch<T>> {
        let existing = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => match serde_json::from_str::<Value>(&raw).ok().and_then(into_entries) {
                Some(entries) => entries,
                None => {
                    warn!(
                        "{} is not a JSON array; starting a fresh log",
                        self.path.display()
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("Opened {} with {} entries", self.path.display(), existing.len());

        Ok(LogBatch {
            path: self.path.clone(),
            existing: existing.len(),
            entries: existing,
            _marker: PhantomData,
        })
    }

    /// Append `entries` and rewrite the file. Returns the new total.
    pub async fn append(&self, entries: &[T]) -> Result<usize> {
        let mut batch = self.open().await?;
        for entry in entries {
            batch.push(entry)?;
        }
        batch.commit().await
    }

    fn corrupt(&self, source: serde_json::Error) -> CampaignError {
        CampaignError::CorruptLog {
            path: self.path.clone(),
            source,
        }
    }

    fn empty(&self) -> CampaignError {
        CampaignError::EmptyLog {
            path: self.path.clone(),
            hint: self.hint.clone(),
        }
    }
}

/// In-memory copy of a log between `open` and `commit`.
///
/// Entries already on disk are kept as raw JSON, so fields this program does
/// not know about survive the rewrite.
#[derive(Debug)]
pub struct LogBatch<T> {
    path: PathBuf,
    existing: usize,
    entries: Vec<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize> LogBatch<T> {
    /// Entries that were on disk when the batch was opened.
    pub fn existing_len(&self) -> usize {
        self.existing
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry to the in-memory batch.
    pub fn push(&mut self, entry: &T) -> Result<()> {
        self.entries.push(serde_json::to_value(entry)?);
        Ok(())
    }

    /// Rewrite the log with the batch. Returns the entry count.
    pub async fn commit(self) -> Result<usize> {
        write_json_pretty(&self.path, &self.entries).await?;
        Ok(self.entries.len())
    }
}

/// Replace `path` with the pretty-printed `value` (2-space indent).
pub async fn write_json_pretty<V>(path: &Path, value: &V) -> Result<()>
where
    V: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let payload = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&temp_path, payload).await?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

fn into_entries(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(_) => Some(vec![value]),
        _ => None,
    }
}
