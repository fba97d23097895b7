use interfaces::{
    CompletionRequest, Contact, ContentLogEntry, ContentPackage, DeliveryLogEntry, NewsletterDraft, SendResponse,
};

#[test]
fn test_wrapped_and_bare_log_entries() -> serde_json::Result<()> {
    let wrapped: ContentLogEntry = serde_json::from_str(
        r#"{"timestamp": "2025-01-01 09:00:00", "topic": "Wrapped", "content_package": {"topic": "Inner"}}"#,
    )?;
    assert_eq!(wrapped.timestamp, "2025-01-01 09:00:00");
    assert_eq!(wrapped.topic, "Wrapped");
    assert_eq!(wrapped.content_package.topic, "Inner");

    let bare: ContentLogEntry =
        serde_json::from_str(r#"{"topic": "Bare", "newsletters": [{"persona": "Startup Founder"}]}"#)?;
    assert_eq!(bare.timestamp, "");
    assert_eq!(bare.topic, "Bare");
    assert_eq!(bare.content_package.newsletters.len(), 1);
    Ok(())
}

#[test]
fn test_wrapped_entry_is_never_read_as_bare() {
    let bad_package = serde_json::from_str::<ContentLogEntry>(
        r#"{"timestamp": "t", "topic": "Wrapped", "content_package": {"newsletters": "x"}}"#,
    );
    assert!(bad_package.is_err());

    let not_an_object =
        serde_json::from_str::<ContentLogEntry>(r#"{"topic": "Wrapped", "content_package": "oops"}"#);
    assert!(not_an_object.is_err());
}

#[test]
fn test_package_fields_are_read_leniently() -> serde_json::Result<()> {
    let entry: ContentLogEntry = serde_json::from_str(
        r#"{
          "timestamp": null,
          "topic": "Wrapped",
          "content_package": {
            "topic": null,
            "blog_outline": null,
            "blog_draft": {"word_goal": 500, "content": null},
            "newsletters": [{"persona": "", "newsletter_id": null, "subject_line": 3}]
          }
        }"#,
    )?;
    let package = &entry.content_package;

    assert_eq!(entry.timestamp, "");
    assert_eq!(package.topic, "");
    assert!(package.blog_outline.is_empty());
    assert_eq!(package.blog_draft.word_goal, "500");
    assert_eq!(package.blog_draft.content, "");
    assert_eq!(package.newsletters[0].persona, None);
    assert_eq!(package.newsletters[0].newsletter_id, None);
    assert_eq!(package.newsletters[0].subject_line, "3");
    Ok(())
}

#[test]
fn test_log_entry_serializes_wrapped() -> serde_json::Result<()> {
    let entry = ContentLogEntry {
        timestamp: "2025-01-01 09:00:00".to_string(),
        topic: "Topic".to_string(),
        content_package: ContentPackage::default(),
    };
    let value = serde_json::to_value(&entry)?;

    assert_eq!(value["topic"], "Topic");
    assert!(value["content_package"].is_object());
    assert!(value["content_package"].get("error").is_none());
    assert!(value["content_package"].get("raw_output").is_none());
    Ok(())
}

#[test]
fn test_failed_package() {
    let package = ContentPackage::failed("Topic", "API call failed: timeout", None);
    assert!(package.is_error());
    assert_eq!(package.topic, "Topic");
    assert!(package.newsletters.is_empty());
    assert!(!ContentPackage::default().is_error());
}

#[test]
fn test_newsletter_defaults() -> serde_json::Result<()> {
    let draft: NewsletterDraft = serde_json::from_str(r#"{"subject_line": "Hi"}"#)?;
    assert_eq!(draft.persona, None);
    assert_eq!(draft.newsletter_id, None);
    assert_eq!(draft.body, "");

    let json = serde_json::to_string(&draft)?;
    assert!(!json.contains("persona"));
    Ok(())
}

#[test]
fn test_delivery_entry_defaults() -> serde_json::Result<()> {
    let entry: DeliveryLogEntry = serde_json::from_str(r#"{"email": "a@x.com"}"#)?;
    assert_eq!(entry.persona, "Unknown");
    assert_eq!(entry.blog_title, None);
    assert_eq!(entry.resend_id, None);
    Ok(())
}

#[test]
fn test_delivery_entry_nulls() -> serde_json::Result<()> {
    let entry: DeliveryLogEntry = serde_json::from_str(
        r#"{"email": null, "persona": null, "newsletter_id": null, "blog_title": null,
            "sent_at": null, "provider": null, "resend_id": null}"#,
    )?;
    assert_eq!(entry.email, "");
    assert_eq!(entry.persona, "Unknown");
    assert_eq!(entry.sent_at, "");
    assert_eq!(entry.blog_title, None);
    assert_eq!(entry.resend_id, None);
    Ok(())
}

#[test]
fn test_contact_nulls_read_as_blank() -> serde_json::Result<()> {
    let contact: Contact = serde_json::from_str(r#"{"email": "a@x.com", "persona": null, "first_name": null}"#)?;
    assert_eq!(contact.email, "a@x.com");
    assert_eq!(contact.persona, "");
    assert_eq!(contact.first_name, "");
    assert_eq!(contact.last_name, "");
    Ok(())
}

#[test]
fn test_send_response() {
    let accepted = SendResponse {
        status: 202,
        body: r#"{"id": "49a3999c-0ce1"}"#.to_string(),
    };
    assert!(accepted.is_accepted());
    assert_eq!(accepted.delivery_id().as_deref(), Some("49a3999c-0ce1"));

    let ok_without_id = SendResponse {
        status: 200,
        body: "not json".to_string(),
    };
    assert!(ok_without_id.is_accepted());
    assert_eq!(ok_without_id.delivery_id(), None);

    for status in [201, 400, 422, 500] {
        let response = SendResponse {
            status,
            body: String::new(),
        };
        assert!(!response.is_accepted(), "status {} should be rejected", status);
    }
}

#[test]
fn test_completion_request_builder() {
    let request = CompletionRequest::new("system", "user")
        .with_temperature(0.7)
        .with_max_tokens(200)
        .with_model(Some("gpt-4o-mini".to_string()));

    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.max_tokens, 200);
    assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(CompletionRequest::new("s", "u").max_tokens, 1200);
}
