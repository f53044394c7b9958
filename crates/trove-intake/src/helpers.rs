//! Report parsing and contact validation helpers.

use std::sync::OnceLock;

use regex::Regex;

/// True when the text looks like a structured record: either a single JSON
/// object or a `Field: value` block.
pub fn is_structured_record(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || field_pattern().is_match(trimmed)
}

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^(Subway Location|Color|Item Category|Item Type|Description)\s*:").unwrap()
    })
}

/// Extract the value of a `Field: value` line, empty string when absent.
///
/// Only the first occurrence counts; the value runs to end of line and is
/// trimmed.
pub fn extract_field(text: &str, field: &str) -> String {
    let pattern = Regex::new(&format!(r"{}\s*:\s*(.*)", regex::escape(field)))
        .expect("static field pattern");
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Explicit quick-info choices a reporter made alongside their free text.
///
/// A chosen value overrides whatever the model extracted for that field.
#[derive(Debug, Clone, Default)]
pub struct ReportChoices {
    pub location: Option<String>,
    pub category: Option<String>,
    pub item_type: Option<String>,
}

/// Rebuild the merged `Field: value` block a lost-item report is
/// standardized from, preferring the reporter's explicit choices over
/// model-extracted values.
pub fn merge_report(model_text: &str, choices: &ReportChoices) -> String {
    let pick = |choice: &Option<String>, field: &str| -> String {
        choice
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| extract_field(model_text, field))
    };

    format!(
        "Subway Location: {}\n\
         Color: {}\n\
         Item Category: {}\n\
         Item Type: {}\n\
         Description: {}\n",
        pick(&choices.location, "Subway Location"),
        extract_field(model_text, "Color"),
        pick(&choices.category, "Item Category"),
        pick(&choices.item_type, "Item Type"),
        extract_field(model_text, "Description"),
    )
}

/// Exactly ten ASCII digits, no spaces or punctuation.
pub fn validate_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Minimal email shape check: an `@` with a dot somewhere after it.
pub fn validate_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
