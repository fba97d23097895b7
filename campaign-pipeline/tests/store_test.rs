mod common;

use campaign_pipeline::store::{write_json_pretty, JsonLog};
use campaign_pipeline::{CampaignError, ContentStore, Result};
use common::{delivery, init_tracing, package};
use serde_json::Value;
use tracing::info;

#[tokio::test]
async fn test_append_and_reload_preserves_order() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log = JsonLog::new(dir.path().join("campaign_log.json"));

    let entries: Vec<_> = (0..5)
        .map(|i| delivery(&format!("user{}@x.com", i), "Founder", "Blog", "2025-01-01T00:00:00+00:00"))
        .collect();

    for (i, entry) in entries.iter().enumerate() {
        let total = log.append(std::slice::from_ref(entry)).await?;
        assert_eq!(total, i + 1);
    }

    let reloaded = log.read_all().await?;
    assert_eq!(reloaded, entries);
    assert_eq!(log.latest().await?.email, "user4@x.com");
    Ok(())
}

#[tokio::test]
async fn test_file_is_pretty_printed_array() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("campaign_log.json");
    let log = JsonLog::new(&path);

    log.append(&[delivery("a@x.com", "Founder", "Blog", "")]).await?;

    let raw = tokio::fs::read_to_string(&path).await?;
    assert!(raw.starts_with("[\n  {\n    \"email\": \"a@x.com\""));

    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap_or(dir.path()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary file left behind");
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ContentStore::new(dir.path().join("generated_content.json"));

    match store.load_latest().await {
        Err(CampaignError::NotFound { hint, .. }) => {
            assert!(hint.contains("campaign generate"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_array_and_blank_file_are_empty_logs() -> Result<()> {
    let dir = tempfile::tempdir()?;

    for (name, contents) in [("array.json", "[]"), ("blank.json", "  \n")] {
        let path = dir.path().join(name);
        tokio::fs::write(&path, contents).await?;
        let store = ContentStore::new(&path);

        assert!(store.load_all().await?.is_empty());
        assert!(matches!(
            store.load_latest().await,
            Err(CampaignError::EmptyLog { .. })
        ));
    }
    Ok(())
}

#[tokio::test]
async fn test_strict_read_reports_corruption() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("generated_content.json");
    tokio::fs::write(&path, "{ not json").await?;

    let store = ContentStore::new(&path);
    assert!(matches!(
        store.load_latest().await,
        Err(CampaignError::CorruptLog { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_append_over_corrupt_file_starts_fresh() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("generated_content.json");
    tokio::fs::write(&path, "this is not json").await?;

    let store = ContentStore::new(&path);
    let total = store.append("Recovery", &package("Recovery", &["Founder"])).await?;

    assert_eq!(total, 1);
    assert_eq!(store.load_latest().await?.topic, "Recovery");
    Ok(())
}

#[tokio::test]
async fn test_single_object_counts_as_one_entry() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("generated_content.json");
    let legacy = serde_json::json!({
        "timestamp": "2024-05-01 09:30:00",
        "topic": "Legacy",
        "content_package": { "topic": "Legacy", "newsletters": [] }
    });
    write_json_pretty(&path, &legacy).await?;

    let store = ContentStore::new(&path);
    assert_eq!(store.load_all().await?.len(), 1);

    let total = store.append("Next", &package("Next", &[])).await?;
    assert_eq!(total, 2);

    let entries = store.load_all().await?;
    assert_eq!(entries[0].topic, "Legacy");
    assert_eq!(entries[1].topic, "Next");
    Ok(())
}

#[tokio::test]
async fn test_unknown_fields_survive_append() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("campaign_log.json");
    tokio::fs::write(
        &path,
        r#"[{"email": "old@x.com", "persona": "Founder", "campaign_notes": "keep me"}]"#,
    )
    .await?;

    let log = JsonLog::new(&path);
    log.append(&[delivery("new@x.com", "Founder", "Blog", "")]).await?;

    let raw: Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    assert_eq!(raw[0]["campaign_notes"], "keep me");
    assert_eq!(raw[1]["email"], "new@x.com");
    Ok(())
}

#[tokio::test]
async fn test_content_entry_carries_local_timestamp() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ContentStore::new(dir.path().join("generated_content.json"));
    store.append("Timestamps", &package("Timestamps", &[])).await?;

    let entry = store.load_latest().await?;
    assert!(
        chrono::NaiveDateTime::parse_from_str(&entry.timestamp, "%Y-%m-%d %H:%M:%S").is_ok(),
        "unexpected timestamp {}",
        entry.timestamp
    );
    Ok(())
}

/// Two writers that both read before either writes: the second commit
/// overwrites the first. This is the documented behaviour of the log.
#[tokio::test]
async fn test_interleaved_writers_lose_first_commit() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log = JsonLog::new(dir.path().join("campaign_log.json"));
    log.append(&[delivery("seed@x.com", "Founder", "Blog", "")]).await?;

    let mut first = log.open().await?;
    let mut second = log.open().await?;
    assert_eq!(first.existing_len(), 1);
    assert_eq!(second.existing_len(), 1);

    first.push(&delivery("first@x.com", "Founder", "Blog", ""))?;
    second.push(&delivery("second@x.com", "Founder", "Blog", ""))?;
    assert_eq!(first.commit().await?, 2);
    assert_eq!(second.commit().await?, 2);

    let emails: Vec<_> = log.read_all().await?.into_iter().map(|e| e.email).collect();
    info!("Surviving entries: {:?}", emails);
    assert_eq!(emails, vec!["seed@x.com", "second@x.com"]);
    Ok(())
}
