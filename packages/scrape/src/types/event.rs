//! The structured event record produced by the pipeline.

use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Placeholder date used when the model could not produce a usable date.
pub const PLACEHOLDER_DATE: &str = "2024-01-01";

/// Placeholder text for missing free-form fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Fallback category when the configured allow-list is empty.
pub const FALLBACK_CATEGORY: &str = "Entertainment";

/// Event category, either a single label or several.
///
/// Downstream UI switches on the JSON shape (string vs. array), so the
/// asymmetry is part of the contract: exactly one valid category is a
/// bare string, two or more are an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    One(String),
    Many(Vec<String>),
}

impl CategoryField {
    /// All labels regardless of shape, in order.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            CategoryField::One(c) => vec![c.as_str()],
            CategoryField::Many(cs) => cs.iter().map(|c| c.as_str()).collect(),
        }
    }
}

/// A scraped event, normalized to the response contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    /// Dollars; 0 for free events.
    pub ticket_cost: f64,
    pub description: String,
    pub number_of_people_going: u64,
    pub category: CategoryField,
    pub platform: Platform,
}

/// How the record was produced.
///
/// Explicit status so callers and tests do not have to pattern-match
/// the description text to tell the degraded paths apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionStatus {
    /// Model call succeeded and the response parsed.
    Ok,
    /// No model credential configured; placeholder record.
    NotConfigured,
    /// Model call or response parsing failed; placeholder record.
    ModelFailure,
}
