use crate::config::GenerationConfig;
use crate::types::{CampaignError, CompletionRequest, ContentPackage, Result, TextGenerator};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const CONTENT_SYSTEM_PROMPT: &str =
    "You are a senior marketing strategist who writes crisp JSON.";
pub const INVALID_JSON_ERROR: &str = "Model did not return valid JSON.";
pub const SCHEMA_MISMATCH_ERROR: &str = "Model returned JSON that does not match the content package schema.";

/// A target audience and what it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaBrief {
    pub name: &'static str,
    pub focus: &'static str,
}

/// Audiences every package writes a newsletter for.
pub const PERSONA_BRIEFS: [PersonaBrief; 3] = [
    PersonaBrief {
        name: "Enterprise Marketing Director",
        focus: "Cares about ROI, campaign consistency, and executive-ready insights.",
    },
    PersonaBrief {
        name: "Startup Founder",
        focus: "Wants scrappy, growth-oriented messaging with clear differentiation.",
    },
    PersonaBrief {
        name: "Freelance Creative Strategist",
        focus: "Looks for inspiring hooks, adaptable assets, and collaboration cues.",
    },
];

/// User prompt asking for a JSON package about `topic`.
pub fn build_topic_prompt(topic: &str) -> String {
    let persona_details = PERSONA_BRIEFS
        .iter()
        .map(|brief| format!("- {}: {}", brief.name, brief.focus))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
You are an editorial strategist. Use the topic "{topic}" to produce planning assets
for a marketing team. Respond ONLY with valid JSON matching this schema:
{{
  "topic": "{topic}",
  "blog_outline": ["short, directive section headlines"],
  "blog_draft": {{
    "word_goal": "400-600 words",
    "content": "narrative blog draft meeting the outline"
  }},
  "newsletters": [
    {{
      "persona": "persona name",
      "angle": "unique spin for that persona",
      "subject_line": "email subject",
      "preview_text": "40-60 char preheader",
      "body": "snappy ~120 word body copy"
    }}
  ]
}}

Guidelines:
- Outline should include 4-6 sections and stay action oriented.
- Blog draft must cite the sections in logical order and stay between 400-600 words.
- Provide exactly three newsletter versions tailored to the personas below.
- Subject lines should stay under 60 characters and must differ.
- Newsletter body copy should reference the blog as the CTA.

Personas to target:
{persona_details}

Return concise JSON with no additional commentary.
"#
    )
}

/// Strip markdown code fences so the JSON inside can be parsed.
pub fn clean_json_blob(raw_text: &str) -> String {
    let cleaned = raw_text.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }

    cleaned
        .lines()
        .filter(|line| !line.trim().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Turn raw model output into a package. Never fails: output that is not
/// JSON, or JSON that is not a package object, becomes a package carrying an
/// error and the raw text.
pub fn parse_package(topic: &str, raw_output: &str) -> ContentPackage {
    let cleaned = clean_json_blob(raw_output);

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model output for '{}' is not JSON: {}", topic, e);
            return ContentPackage::failed(topic, INVALID_JSON_ERROR, Some(raw_output.to_string()));
        }
    };

    let parsed = match value {
        Value::Object(_) => serde_json::from_value::<ContentPackage>(value).map_err(|e| e.to_string()),
        other => Err(format!("expected a JSON object, got {}", json_kind(&other))),
    };

    match parsed {
        Ok(mut package) => {
            if package.topic.is_empty() {
                package.topic = topic.to_string();
            }
            if package.raw_output.is_none() {
                package.raw_output = Some(raw_output.to_string());
            }
            package
        }
        Err(reason) => {
            warn!("Model output for '{}' is not a content package: {}", topic, reason);
            ContentPackage::failed(topic, SCHEMA_MISMATCH_ERROR, Some(raw_output.to_string()))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds content packages from a topic with a single generation call.
pub struct ContentGenerator {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_tokens: u32,
    model: Option<String>,
}

impl ContentGenerator {
    /// Generator with the default sampling settings and the adapter's model.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            temperature: 0.7,
            max_tokens: 1200,
            model: None,
        }
    }

    /// Generator using the configured model, temperature and token budget.
    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            generator,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            model: Some(config.model.clone()),
        }
    }

    /// Only an empty topic is an error. Transport and parse failures come
    /// back in-band as a package with `error` set.
    pub async fn build_package(&self, topic: &str) -> Result<ContentPackage> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(CampaignError::General(
                "Topic is required to generate content.".to_string(),
            ));
        }

        let request = CompletionRequest::new(CONTENT_SYSTEM_PROMPT, build_topic_prompt(topic))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_model(self.model.clone());

        info!(
            "Generating content package for '{}' with {}",
            topic,
            self.generator.generator_name()
        );

        let raw_output = match self.generator.complete(&request).await {
            Ok(raw) => raw.trim().to_string(),
            Err(e) => {
                warn!("Content generation failed for '{}': {:#}", topic, e);
                return Ok(ContentPackage::failed(
                    topic,
                    format!("API call failed: {}", e),
                    None,
                ));
            }
        };

        debug!("Received {} bytes of model output", raw_output.len());
        Ok(parse_package(topic, &raw_output))
    }
}
