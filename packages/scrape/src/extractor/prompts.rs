//! Prompt construction for event extraction.

use crate::types::platform::Platform;

/// Page text beyond this many characters is not sent to the model.
pub const MAX_PAGE_CHARS: usize = 4000;

/// System prompt for the extraction call.
pub const EXTRACT_SYSTEM_PROMPT: &str =
    "You are a precise data extraction assistant. Always return valid JSON with the exact field names requested.";

/// Build the user prompt for one extraction call.
///
/// Instructs the model to return a single raw JSON object with the
/// exact `EventRecord` field set, with `category` restricted to the
/// allow-list (string or array of strings).
pub fn format_extract_prompt(page_text: &str, platform: Platform, categories: &[String]) -> String {
    let category_list = categories.join(", ");
    let bounded_text: String = page_text.chars().take(MAX_PAGE_CHARS).collect();

    format!(
        r#"You are an expert at extracting event information from website content.
Extract the following information from this {platform} event page content and return it as a JSON object:

Required fields with specific formats:
- eventName: The name/title of the event (string)
- date: Event date in YYYY-MM-DD format (string, e.g. "2024-07-17")
- startTime: Event start time in HH:MM AM/PM format (string, e.g. "7:00 PM")
- endTime: Event end time in HH:MM AM/PM format (string, e.g. "8:30 PM", use "Not specified" if no end time given)
- location: Where the event is taking place (string, use "Not specified" if hidden/unknown)
- ticketCost: Price as a number in dollars (number, use 0 for free events, extract just the numeric value from "$10" -> 10)
- description: Brief description of the event (string)
- numberOfPeopleGoing: Number of people attending/interested as a number (number, extract from RSVP count, use 0 if unknown)
- category: Must be one or more categories from this EXACT list: {category_list}.
  Can be a single string (e.g. "Technology") or an array of strings (e.g. ["Technology", "Entertainment"]) if multiple categories apply.
  ONLY use categories from the provided list, do not create new categories.

Available categories to choose from: {category_list}

Website content:
{bounded_text}

IMPORTANT:
- Return ONLY a raw JSON object, no markdown code blocks
- Ensure ticketCost and numberOfPeopleGoing are numbers, not strings
- Use proper date format (YYYY-MM-DD) for the date field
- If you can't determine the year, use 2024
- For category, ONLY use the exact category names from the provided list
- If multiple categories apply, use an array; if only one applies, use a string
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_categories_and_platform() {
        let categories = vec!["Music".to_string(), "Tech".to_string()];
        let prompt = format_extract_prompt("Some event page", Platform::Partiful, &categories);

        assert!(prompt.contains("this partiful event page"));
        assert!(prompt.contains("EXACT list: Music, Tech"));
        assert!(prompt.contains("Some event page"));
    }

    #[test]
    fn prompt_bounds_page_text() {
        // Marker character that never occurs in the prompt template
        let long_text = "ß".repeat(MAX_PAGE_CHARS * 2);
        let prompt = format_extract_prompt(&long_text, Platform::Unknown, &[]);

        let embedded = prompt.matches('ß').count();
        assert_eq!(embedded, MAX_PAGE_CHARS);
    }

    #[test]
    fn prompt_truncation_is_char_safe() {
        // Multibyte content near the cut must not panic
        let text = "é".repeat(MAX_PAGE_CHARS + 10);
        let prompt = format_extract_prompt(&text, Platform::Unknown, &[]);
        assert!(prompt.contains('é'));
    }
}
