use crate::store::{write_json_pretty, JsonLog};
use crate::types::{CompletionRequest, DeliveryLogEntry, GenerationError, Result, TextGenerator};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful marketing analyst.";
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaStats {
    pub send_count: usize,
    pub unique_contacts: usize,
    pub latest_blog: Option<String>,
    /// RFC 3339 timestamp of the newest parseable send, or `N/A`.
    pub last_sent_at: String,
}

/// Persona -> stats, in order of first appearance in the delivery log.
pub type PerformanceSnapshot = IndexMap<String, PersonaStats>;

#[derive(Default)]
struct Accumulator<'a> {
    send_count: usize,
    emails: IndexSet<&'a str>,
    latest_blog: Option<String>,
    last_sent_at: Option<DateTime<Utc>>,
}

/// Parse a delivery timestamp. Offsets are honoured; naive timestamps are
/// read as UTC.
pub fn parse_sent_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Group entries by persona and compute the per-persona stats.
pub fn aggregate_entries(entries: &[DeliveryLogEntry]) -> PerformanceSnapshot {
    let mut groups: IndexMap<&str, Accumulator<'_>> = IndexMap::new();

    for entry in entries {
        let stats = groups.entry(entry.persona.as_str()).or_default();
        stats.send_count += 1;
        if !entry.email.is_empty() {
            stats.emails.insert(entry.email.as_str());
        }
        stats.latest_blog = entry.blog_title.clone();

        match parse_sent_at(&entry.sent_at) {
            Some(sent_at) => {
                if stats.last_sent_at.map_or(true, |last| sent_at > last) {
                    stats.last_sent_at = Some(sent_at);
                }
            }
            None if !entry.sent_at.is_empty() => {
                debug!("Ignoring unparseable sent_at '{}' for {}", entry.sent_at, entry.email);
            }
            None => {}
        }
    }

    groups
        .into_iter()
        .map(|(persona, stats)| {
            (
                persona.to_string(),
                PersonaStats {
                    send_count: stats.send_count,
                    unique_contacts: stats.emails.len(),
                    latest_blog: stats.latest_blog,
                    last_sent_at: stats
                        .last_sent_at
                        .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, false))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                },
            )
        })
        .collect()
}

/// Persona with the highest send count. The earliest persona wins a tie.
pub fn most_volume(snapshot: &PerformanceSnapshot) -> Option<&str> {
    snapshot
        .iter()
        .fold(None, |best: Option<(&String, usize)>, (persona, stats)| match best {
            Some((_, count)) if count >= stats.send_count => best,
            _ => Some((persona, stats.send_count)),
        })
        .map(|(persona, _)| persona.as_str())
}

/// Analyst prompt embedding the snapshot and the busiest persona.
pub fn build_summary_prompt(snapshot: &PerformanceSnapshot) -> Result<String> {
    let data = serde_json::to_string_pretty(snapshot)?;
    let leader = most_volume(snapshot).unwrap_or("None");

    Ok(format!(
        r#"
You are a marketing analyst. Here is live newsletter delivery data grouped by persona:
{data}
- Send_count reflects actual Resend deliveries logged in campaign_log.json.
Please write 2 short sentences: highlight which persona had the most volume (currently {leader}),
and suggest one action to improve overall engagement next cycle.
"#
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub snapshot: PerformanceSnapshot,
    /// `None` when no generator was configured.
    pub summary: Option<std::result::Result<String, GenerationError>>,
}

impl PerformanceReport {
    /// The summary as shown to users; failures read "Error generating AI summary: ...".
    pub fn summary_text(&self) -> Option<String> {
        self.summary.as_ref().map(|summary| match summary {
            Ok(text) => text.clone(),
            Err(e) => format!("Error generating AI summary: {}", e),
        })
    }
}

/// Recomputes per-persona delivery stats from the delivery log.
pub struct PerformanceAggregator {
    log: JsonLog<DeliveryLogEntry>,
    snapshot_path: PathBuf,
    generator: Option<Arc<dyn TextGenerator>>,
    summary_model: Option<String>,
    summary_max_tokens: u32,
}

impl PerformanceAggregator {
    /// Aggregator without a summary step.
    pub fn new(log: JsonLog<DeliveryLogEntry>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            log,
            snapshot_path: snapshot_path.into(),
            generator: None,
            summary_model: None,
            summary_max_tokens: 200,
        }
    }

    /// Also ask `generator` for a summary after each run.
    pub fn with_summary(
        mut self,
        generator: Arc<dyn TextGenerator>,
        model: Option<String>,
        max_tokens: u32,
    ) -> Self {
        self.generator = Some(generator);
        self.summary_model = model;
        self.summary_max_tokens = max_tokens;
        self
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Read the log, overwrite the snapshot file and, if a generator is set,
    /// ask it for a summary. A failed summary does not fail the run.
    pub async fn aggregate(&self) -> Result<PerformanceReport> {
        let entries = self.log.read_non_empty().await?;
        let snapshot = aggregate_entries(&entries);

        write_json_pretty(&self.snapshot_path, &snapshot).await?;
        info!(
            "Performance snapshot for {} personas saved to {}",
            snapshot.len(),
            self.snapshot_path.display()
        );

        let summary = match &self.generator {
            Some(generator) => Some(self.summarize(generator.as_ref(), &snapshot).await?),
            None => None,
        };

        Ok(PerformanceReport { snapshot, summary })
    }

    async fn summarize(
        &self,
        generator: &dyn TextGenerator,
        snapshot: &PerformanceSnapshot,
    ) -> Result<std::result::Result<String, GenerationError>> {
        let request = CompletionRequest::new(SUMMARY_SYSTEM_PROMPT, build_summary_prompt(snapshot)?)
            .with_max_tokens(self.summary_max_tokens)
            .with_model(self.summary_model.clone());

        let summary = match generator.complete(&request).await {
            Ok(text) if text.trim().is_empty() => Err(GenerationError::EmptyCompletion),
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => Err(GenerationError::Transport(format!("{:#}", e))),
        };

        if let Err(e) = &summary {
            warn!("Summary generation failed: {}", e);
        }
        Ok(summary)
    }
}
