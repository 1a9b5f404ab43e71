//! Event extraction from raw page text.
//!
//! The hosted model is treated as an unreliable, rate-limited,
//! non-deterministic external service: the extractor never lets a
//! model-side failure escape as an error. Every outcome is a
//! structurally valid [`EventRecord`]; the [`ExtractionStatus`] says
//! which path produced it.

mod openai;
pub mod prompts;

pub use openai::OpenAiChat;
pub use prompts::{format_extract_prompt, EXTRACT_SYSTEM_PROMPT, MAX_PAGE_CHARS};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ModelResult;
use crate::normalizer::{default_category, normalize};
use crate::types::event::{CategoryField, EventRecord, ExtractionStatus, PLACEHOLDER_DATE};
use crate::types::platform::Platform;

/// Characters of raw page text embedded in the "not configured" placeholder.
const NOT_CONFIGURED_PREVIEW_CHARS: usize = 500;

/// Characters of raw page text embedded in the failure placeholder.
const FAILURE_PREVIEW_CHARS: usize = 200;

/// One chat completion: prompt in, raw text out.
///
/// Constructor-injected into the extractor so tests can substitute a
/// stub without any network dependency.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<String>;
}

/// An extraction outcome: the record plus how it was produced.
#[derive(Debug, Clone)]
pub struct ExtractedEvent {
    pub record: EventRecord,
    pub status: ExtractionStatus,
}

/// Turns unstructured page text into a draft [`EventRecord`].
pub struct EventExtractor {
    model: Option<Arc<dyn ChatModel>>,
}

impl EventExtractor {
    /// `model: None` puts the extractor in degraded mode: every call
    /// yields a clearly-labeled placeholder record.
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { model }
    }

    /// Whether a model credential is configured.
    pub fn model_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Extract an event record from page text.
    ///
    /// Never fails: model errors and unparseable responses degrade to
    /// placeholder records with the diagnosis embedded in the
    /// description.
    pub async fn extract(
        &self,
        page_text: &str,
        platform: Platform,
        categories: &[String],
    ) -> ExtractedEvent {
        let model = match &self.model {
            Some(model) => model,
            None => {
                info!("No model configured - returning placeholder with raw content");
                return ExtractedEvent {
                    record: not_configured_record(page_text, platform, categories),
                    status: ExtractionStatus::NotConfigured,
                };
            }
        };

        let prompt = format_extract_prompt(page_text, platform, categories);

        debug!(prompt_chars = prompt.chars().count(), "Calling model");
        let raw = match model.complete(EXTRACT_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Model call failed");
                return ExtractedEvent {
                    record: failure_record(page_text, platform, categories, &e.to_string()),
                    status: ExtractionStatus::ModelFailure,
                };
            }
        };

        let cleaned = strip_code_fences(&raw);

        match serde_json::from_str::<serde_json::Value>(cleaned) {
            Ok(draft) => {
                let record = normalize(&draft, categories, platform);
                debug!(event_name = %record.event_name, "Extraction parsed");
                ExtractedEvent {
                    record,
                    status: ExtractionStatus::Ok,
                }
            }
            Err(e) => {
                warn!(error = %e, raw_response = %cleaned, "Model response was not valid JSON");
                ExtractedEvent {
                    record: failure_record(
                        page_text,
                        platform,
                        categories,
                        &format!("invalid JSON response from model: {}", e),
                    ),
                    status: ExtractionStatus::ModelFailure,
                }
            }
        }
    }
}

/// Strip optional surrounding markdown code fences from a model reply.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();

    let without_open = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    without_open
        .trim_start()
        .trim_end_matches("```")
        .trim()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Placeholder for operation without a model credential. The raw page
/// text preview makes manual inspection possible.
fn not_configured_record(
    page_text: &str,
    platform: Platform,
    categories: &[String],
) -> EventRecord {
    EventRecord {
        event_name: "Mock Event (model not configured)".to_string(),
        date: PLACEHOLDER_DATE.to_string(),
        start_time: "Start time extraction requires a model".to_string(),
        end_time: "End time extraction requires a model".to_string(),
        location: "Location extraction requires a model".to_string(),
        ticket_cost: 0.0,
        description: format!(
            "Raw scraped content (first {} chars): {}",
            NOT_CONFIGURED_PREVIEW_CHARS,
            truncate_chars(page_text, NOT_CONFIGURED_PREVIEW_CHARS)
        ),
        number_of_people_going: 0,
        category: CategoryField::One(default_category(categories)),
        platform,
    }
}

/// Placeholder for a failed model call or unparseable response. The
/// error message stays inspectable in the description.
fn failure_record(
    page_text: &str,
    platform: Platform,
    categories: &[String],
    error: &str,
) -> EventRecord {
    EventRecord {
        event_name: "Could not extract event name".to_string(),
        date: PLACEHOLDER_DATE.to_string(),
        start_time: "Could not extract start time".to_string(),
        end_time: "Could not extract end time".to_string(),
        location: "Could not extract location".to_string(),
        ticket_cost: 0.0,
        description: format!(
            "Model processing failed. Error: {}. Raw content: {}...",
            error,
            truncate_chars(page_text, FAILURE_PREVIEW_CHARS)
        ),
        number_of_people_going: 0,
        category: CategoryField::One(default_category(categories)),
        platform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::testing::MockChatModel;

    fn allow_list() -> Vec<String> {
        vec!["Music".to_string(), "Art".to_string(), "Tech".to_string()]
    }

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn no_model_yields_not_configured_placeholder() {
        let extractor = EventExtractor::new(None);
        let outcome = extractor
            .extract("Some raw page text", Platform::Partiful, &allow_list())
            .await;

        assert_eq!(outcome.status, ExtractionStatus::NotConfigured);
        assert_eq!(
            outcome.record.event_name,
            "Mock Event (model not configured)"
        );
        assert!(outcome.record.description.contains("Some raw page text"));
        assert_eq!(outcome.record.platform, Platform::Partiful);
        assert_eq!(
            outcome.record.category,
            CategoryField::One("Music".to_string())
        );
    }

    #[tokio::test]
    async fn fenced_response_parses_and_normalizes() {
        let model = MockChatModel::new().with_response(
            r#"```json
{
  "eventName": "Gallery Night",
  "date": "2024-09-12",
  "startTime": "6:00 PM",
  "endTime": "9:00 PM",
  "location": "Downtown",
  "ticketCost": "$12",
  "description": "Art walk",
  "numberOfPeopleGoing": "80 going",
  "category": ["Art", "FakeCat"],
  "platform": "posh"
}
```"#,
        );

        let extractor = EventExtractor::new(Some(Arc::new(model)));
        let outcome = extractor
            .extract("page text", Platform::Partiful, &allow_list())
            .await;

        assert_eq!(outcome.status, ExtractionStatus::Ok);
        assert_eq!(outcome.record.event_name, "Gallery Night");
        assert_eq!(outcome.record.ticket_cost, 12.0);
        assert_eq!(outcome.record.number_of_people_going, 80);
        assert_eq!(
            outcome.record.category,
            CategoryField::One("Art".to_string())
        );
        // Platform comes from the hint, not the model
        assert_eq!(outcome.record.platform, Platform::Partiful);
    }

    #[tokio::test]
    async fn model_error_yields_failure_placeholder() {
        let model = MockChatModel::new().with_error(ModelError::Api("quota exceeded".to_string()));

        let extractor = EventExtractor::new(Some(Arc::new(model)));
        let outcome = extractor
            .extract("page text here", Platform::Posh, &allow_list())
            .await;

        assert_eq!(outcome.status, ExtractionStatus::ModelFailure);
        assert_eq!(outcome.record.event_name, "Could not extract event name");
        assert!(outcome.record.description.contains("quota exceeded"));
        assert!(outcome.record.description.contains("page text here"));
        assert_eq!(outcome.record.platform, Platform::Posh);
    }

    #[tokio::test]
    async fn unparseable_response_yields_failure_placeholder() {
        let model = MockChatModel::new().with_response("the event is on friday, no json here");

        let extractor = EventExtractor::new(Some(Arc::new(model)));
        let outcome = extractor
            .extract("page text", Platform::Unknown, &allow_list())
            .await;

        assert_eq!(outcome.status, ExtractionStatus::ModelFailure);
        assert!(outcome
            .record
            .description
            .contains("invalid JSON response from model"));
    }

    #[tokio::test]
    async fn prompt_receives_bounded_text_and_categories() {
        let model = MockChatModel::new().with_response("{}");
        let extractor = EventExtractor::new(Some(Arc::new(model.clone())));

        // Marker character that never occurs in the prompt template
        let long_text = "ß".repeat(MAX_PAGE_CHARS * 3);
        let _ = extractor
            .extract(&long_text, Platform::Unknown, &allow_list())
            .await;

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user.contains("Music, Art, Tech"));
        assert_eq!(calls[0].user.matches('ß').count(), MAX_PAGE_CHARS);
        assert_eq!(calls[0].system, EXTRACT_SYSTEM_PROMPT);
    }
}
