use crate::campaign::CampaignOverview;
use crate::delivery::BulkReport;
use crate::performance::PerformanceReport;
use crate::types::{ContentPackage, DeliveryLogEntry};
use crate::utils::text::{fill, or_placeholder};
use std::fmt::Write;

const WRAP_WIDTH: usize = 100;

/// Console rendering of a generated package. Failed packages show the error
/// and whatever the model returned.
pub fn render_package(package: &ContentPackage) -> String {
    let mut out = String::new();

    if let Some(error) = &package.error {
        let _ = writeln!(out, "\n⚠️ {}", error);
        if let Some(raw) = package.raw_output.as_deref().filter(|raw| !raw.is_empty()) {
            let _ = writeln!(out, "\nRaw model output:\n{}", raw);
        }
        return out;
    }

    let _ = writeln!(out, "\n=== Blog Outline ===");
    if package.blog_outline.is_empty() {
        let _ = writeln!(out, "No outline returned.");
    }
    for (idx, item) in package.blog_outline.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, item);
    }

    let _ = writeln!(out, "\n=== Blog Draft (~400-600 words) ===");
    if package.blog_draft.content.trim().is_empty() {
        let _ = writeln!(out, "No draft returned.");
    } else {
        let _ = writeln!(out, "{}", fill(&package.blog_draft.content, WRAP_WIDTH));
    }

    let _ = writeln!(out, "\n=== Persona Newsletters ===");
    if package.newsletters.is_empty() {
        let _ = writeln!(out, "No newsletters returned.");
    }
    for (idx, letter) in package.newsletters.iter().enumerate() {
        let persona = letter.persona.as_deref().unwrap_or("Persona TBD");
        let _ = writeln!(out, "\n--- Newsletter #{}: {} ---", idx + 1, persona);
        let _ = writeln!(out, "Subject: {}", or_placeholder(&letter.subject_line, "N/A"));
        let _ = writeln!(out, "Preview: {}", or_placeholder(&letter.preview_text, "N/A"));
        let _ = writeln!(out, "{}", fill(&letter.body, WRAP_WIDTH));
    }

    out
}

/// Campaign title followed by one persona per line.
pub fn render_overview(overview: &CampaignOverview) -> String {
    let mut out = format!("Latest campaign: {}\n", overview.blog_title);
    if overview.personas.is_empty() {
        out.push_str("No persona newsletters in this campaign.\n");
    }
    for persona in &overview.personas {
        let _ = writeln!(out, "  - {}", persona);
    }
    out
}

/// One-line confirmation for a delivered newsletter.
pub fn render_delivery(entry: &DeliveryLogEntry) -> String {
    format!(
        "✅ {} ({}) <- {} [{}]",
        entry.email,
        entry.persona,
        entry.newsletter_id,
        entry.resend_id.as_deref().unwrap_or("no id")
    )
}

/// Per-contact outcome of a bulk send and what was logged.
pub fn render_bulk_report(report: &BulkReport) -> String {
    let mut out = format!("Campaign: {}\n", report.blog_title);
    for entry in &report.delivered {
        let _ = writeln!(out, "{}", render_delivery(entry));
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "⚠️ Skipped {} ({}): {}", skipped.email, skipped.persona, skipped.reason);
    }
    match report.log_size {
        Some(total) => {
            let _ = writeln!(
                out,
                "Logged {} deliveries ({} total).",
                report.delivered.len(),
                total
            );
        }
        None => out.push_str("No deliveries logged.\n"),
    }
    out
}

/// Snapshot table followed by the summary, if any.
pub fn render_performance(report: &PerformanceReport) -> String {
    let mut out = String::from("=== Performance by Persona ===\n");
    for (persona, stats) in &report.snapshot {
        let _ = writeln!(
            out,
            "{}: {} sends, {} unique contacts, latest blog: {}, last sent: {}",
            persona,
            stats.send_count,
            stats.unique_contacts,
            stats.latest_blog.as_deref().unwrap_or("N/A"),
            stats.last_sent_at
        );
    }
    if let Some(summary) = report.summary_text() {
        let _ = writeln!(out, "\n=== AI Summary ===\n{}", fill(&summary, WRAP_WIDTH));
    }
    out
}
