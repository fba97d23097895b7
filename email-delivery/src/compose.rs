use interfaces::defs::{EmailPayload, EmailTag, NewsletterDraft};

pub const PERSONA_TAG_FALLBACK: &str = "persona";
pub const CAMPAIGN_TAG_FALLBACK: &str = "campaign";

/// Rendered subject and bodies for one newsletter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterContent {
    pub subject: String,
    pub plain_text: String,
    pub html: String,
}

/// Subject and bodies for one newsletter. An empty subject line falls back to the blog title.
pub fn build_content(newsletter: &NewsletterDraft, blog_title: &str) -> NewsletterContent {
    let subject = if newsletter.subject_line.is_empty() {
        format!("Latest insights: {}", blog_title)
    } else {
        newsletter.subject_line.clone()
    };
    let preview = &newsletter.preview_text;
    let body = &newsletter.body;

    NewsletterContent {
        subject,
        plain_text: format!("{}\n\n{}\n\nRead the full blog: {}", preview, body, blog_title),
        html: format!(
            "<p>{}</p><p>{}</p><p><strong>Read the full blog:</strong> {}</p>",
            preview, body, blog_title
        ),
    }
}

/// Restrict a tag value to `[A-Za-z0-9_-]`.
///
/// Every other character becomes `-`, runs of `-` collapse to one, and
/// leading/trailing `-` are dropped. An empty result yields `fallback`.
pub fn slugify_tag(value: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(value.len());

    for c in value.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Complete Resend payload with persona and campaign tags.
pub fn newsletter_payload(
    from_email: &str,
    to_email: &str,
    newsletter: &NewsletterDraft,
    blog_title: &str,
    persona: &str,
) -> EmailPayload {
    let content = build_content(newsletter, blog_title);

    EmailPayload {
        from: from_email.to_string(),
        to: vec![to_email.to_string()],
        subject: content.subject,
        text: content.plain_text,
        html: content.html,
        tags: vec![
            EmailTag {
                name: "persona".to_string(),
                value: slugify_tag(persona, PERSONA_TAG_FALLBACK),
            },
            EmailTag {
                name: "campaign".to_string(),
                value: slugify_tag(blog_title, CAMPAIGN_TAG_FALLBACK),
            },
        ],
    }
}
