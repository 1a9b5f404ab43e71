//! Normalization of raw model output into a valid [`EventRecord`].
//!
//! The model is treated as untrusted: any field may be missing, the
//! wrong type, or outside the category allow-list. `normalize` is a
//! total function; every malformed draft maps to some valid record.

use serde_json::Value;

use crate::types::event::{
    CategoryField, EventRecord, FALLBACK_CATEGORY, NOT_SPECIFIED, PLACEHOLDER_DATE,
};
use crate::types::platform::Platform;

/// Make an arbitrary draft conform to the `EventRecord` invariants.
///
/// `platform` always wins over whatever the draft claims; the model is
/// never trusted for that field.
pub fn normalize(draft: &Value, categories: &[String], platform: Platform) -> EventRecord {
    EventRecord {
        event_name: text_field(draft, "eventName"),
        date: date_field(draft),
        start_time: text_field(draft, "startTime"),
        end_time: text_field(draft, "endTime"),
        location: text_field(draft, "location"),
        ticket_cost: coerce_cost(draft.get("ticketCost")),
        description: text_field(draft, "description"),
        number_of_people_going: coerce_count(draft.get("numberOfPeopleGoing")),
        category: normalize_category(draft.get("category"), categories),
        platform,
    }
}

/// First entry of the allow-list, or the built-in fallback label.
pub fn default_category(categories: &[String]) -> String {
    categories
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

fn text_field(draft: &Value, key: &str) -> String {
    match draft.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        // Non-string scalars are still text to the caller
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn date_field(draft: &Value) -> String {
    match draft.get("date") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => PLACEHOLDER_DATE.to_string(),
    }
}

/// Coerce a ticket cost to dollars.
///
/// Numbers pass through (clamped to zero); strings are stripped to
/// digits and decimal points before parsing, so "$25.50 suggested"
/// becomes 25.50 and "free" becomes 0.
fn coerce_cost(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0).max(0.0),
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            digits.parse::<f64>().unwrap_or(0.0).max(0.0)
        }
        _ => 0.0,
    }
}

/// Coerce an attendee count to an integer.
fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<u64>().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Restrict the category field to the allow-list.
///
/// A single string is treated as a one-element list. Order is
/// preserved while invalid entries are dropped. The string/array
/// asymmetry of the result is part of the contract: exactly one
/// survivor is represented as a bare string.
fn normalize_category(value: Option<&Value>, categories: &[String]) -> CategoryField {
    let candidates: Vec<String> = match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    let mut valid: Vec<String> = candidates
        .into_iter()
        .filter(|c| categories.iter().any(|allowed| allowed == c))
        .collect();

    match valid.len() {
        0 => CategoryField::One(default_category(categories)),
        1 => CategoryField::One(valid.remove(0)),
        _ => CategoryField::Many(valid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allow_list() -> Vec<String> {
        vec!["Music".to_string(), "Art".to_string(), "Tech".to_string()]
    }

    #[test]
    fn missing_fields_get_defaults() {
        let record = normalize(&json!({}), &allow_list(), Platform::Unknown);

        assert_eq!(record.event_name, NOT_SPECIFIED);
        assert_eq!(record.date, PLACEHOLDER_DATE);
        assert_eq!(record.start_time, NOT_SPECIFIED);
        assert_eq!(record.end_time, NOT_SPECIFIED);
        assert_eq!(record.location, NOT_SPECIFIED);
        assert_eq!(record.ticket_cost, 0.0);
        assert_eq!(record.description, NOT_SPECIFIED);
        assert_eq!(record.number_of_people_going, 0);
        assert_eq!(record.category, CategoryField::One("Music".to_string()));
        assert_eq!(record.platform, Platform::Unknown);
    }

    #[test]
    fn category_filter_preserves_order() {
        let draft = json!({ "category": ["Music", "FakeCat", "Art"] });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(
            record.category,
            CategoryField::Many(vec!["Music".to_string(), "Art".to_string()])
        );
    }

    #[test]
    fn category_single_survivor_is_a_string() {
        let draft = json!({ "category": ["FakeCat", "Art"] });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(record.category, CategoryField::One("Art".to_string()));
    }

    #[test]
    fn category_no_survivors_falls_back_to_first() {
        let draft = json!({ "category": "FakeCat" });
        let allow = vec!["Music".to_string(), "Art".to_string()];
        let record = normalize(&draft, &allow, Platform::Unknown);
        assert_eq!(record.category, CategoryField::One("Music".to_string()));
    }

    #[test]
    fn category_empty_allow_list_uses_builtin_fallback() {
        let record = normalize(&json!({}), &[], Platform::Unknown);
        assert_eq!(
            record.category,
            CategoryField::One(FALLBACK_CATEGORY.to_string())
        );
    }

    #[test]
    fn cost_coercion_strips_currency_text() {
        let draft = json!({ "ticketCost": "$25.50 suggested" });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(record.ticket_cost, 25.50);
    }

    #[test]
    fn cost_coercion_defaults_on_no_digits() {
        let draft = json!({ "ticketCost": "free" });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(record.ticket_cost, 0.0);
    }

    #[test]
    fn cost_accepts_numbers_directly() {
        let draft = json!({ "ticketCost": 12.5 });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(record.ticket_cost, 12.5);
    }

    #[test]
    fn count_coercion_strips_text() {
        let draft = json!({ "numberOfPeopleGoing": "142 going" });
        let record = normalize(&draft, &allow_list(), Platform::Unknown);
        assert_eq!(record.number_of_people_going, 142);
    }

    #[test]
    fn platform_overrides_model_claim() {
        let draft = json!({ "platform": "posh" });
        let record = normalize(&draft, &allow_list(), Platform::Partiful);
        assert_eq!(record.platform, Platform::Partiful);
    }

    #[test]
    fn normalize_is_idempotent() {
        let draft = json!({
            "eventName": "Warehouse Party",
            "ticketCost": "$15",
            "numberOfPeopleGoing": "90 going",
            "category": ["Music", "FakeCat", "Art"],
        });

        let once = normalize(&draft, &allow_list(), Platform::Posh);
        let round_tripped = serde_json::to_value(&once).unwrap();
        let twice = normalize(&round_tripped, &allow_list(), Platform::Posh);

        assert_eq!(once, twice);
    }
}
