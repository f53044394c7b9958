//! Record standardizer.
//!
//! Maps a free-text or semi-structured item record onto the tag catalog's
//! closed vocabulary by delegating field matching to the generation
//! backend, then normalizing whatever came back into a type-stable
//! [`CanonicalRecord`]. The generation step is non-deterministic and may
//! violate the schema; every downstream consumer gets a fully-populated
//! record regardless.

use tracing::{debug, warn};

use trove_core::{CanonicalRecord, GenerationBackend, Result, TagCatalog};
use trove_inference::{standardizer_user_prompt, STANDARDIZER_SYSTEM_PROMPT};

/// Standardize a raw textual record against the catalog.
///
/// Returns `Err` only when the generation backend itself fails. Unparsable
/// model output is recovered locally: the fallback record carries the raw
/// input verbatim as its description.
pub async fn standardize(
    generation: &dyn GenerationBackend,
    raw_text: &str,
    catalog: &TagCatalog,
) -> Result<CanonicalRecord> {
    let prompt = standardizer_user_prompt(catalog, raw_text);
    let response = generation
        .generate_with_system(STANDARDIZER_SYSTEM_PROMPT, &prompt)
        .await?;

    Ok(normalize_response(&response, raw_text))
}

/// Parse and normalize a model response, falling back on failure.
///
/// Never fails: this is the recovery boundary for schema violations.
pub fn normalize_response(response: &str, raw_text: &str) -> CanonicalRecord {
    let Some(span) = extract_json_span(response) else {
        warn!(
            subsystem = "intake",
            component = "standardizer",
            response_len = response.len(),
            "No JSON object in model response, using fallback record"
        );
        return CanonicalRecord::fallback(raw_text);
    };

    match serde_json::from_str::<serde_json::Value>(span) {
        Ok(value) => {
            debug!(
                subsystem = "intake",
                component = "standardizer",
                op = "standardize",
                "Parsed model response"
            );
            CanonicalRecord::from_model_json(&value)
        }
        Err(e) => {
            warn!(
                subsystem = "intake",
                component = "standardizer",
                error = %e,
                "Model response is not valid JSON, using fallback record"
            );
            CanonicalRecord::fallback(raw_text)
        }
    }
}

/// Locate the JSON object span: first `{` to last `}` of the trimmed text.
///
/// Tolerates leading/trailing commentary around the object; this is not a
/// full JSON scan, so malformed interior braces are left to the parser.
fn extract_json_span(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_core::{Error, CATEGORY_NONE};
    use trove_inference::mock::MockInferenceBackend;

    fn catalog() -> TagCatalog {
        TagCatalog {
            locations: vec!["Union Square".into()],
            colors: vec!["Blue".into()],
            categories: vec!["Electronics".into()],
            item_types: vec!["Phone".into()],
        }
    }

    #[test]
    fn test_extract_json_span_tolerates_commentary() {
        let text = "Sure, here is the record:\n{\"a\": 1}\nLet me know!";
        assert_eq!(extract_json_span(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_span_none_without_braces() {
        assert_eq!(extract_json_span("no json here"), None);
        assert_eq!(extract_json_span("} backwards {"), None);
    }

    #[tokio::test]
    async fn test_standardize_parses_well_formed_output() {
        let backend = MockInferenceBackend::new().with_fixed_response(
            r#"{"subway_location":["Union Square"],"color":["Blue"],
                "item_category":"Electronics","item_type":["Phone"],
                "description":"blue phone","time":"2024-05-01T12:00:00+00:00"}"#,
        );

        let record = standardize(&backend, "blue phone lost at union square", &catalog())
            .await
            .unwrap();
        assert_eq!(record.item_category, "Electronics");
        assert_eq!(record.color, vec!["Blue"]);
        assert_eq!(record.description, "blue phone");
    }

    #[tokio::test]
    async fn test_standardize_normalizes_bare_strings() {
        let backend = MockInferenceBackend::new().with_fixed_response(
            r#"{"subway_location":"Union Square","color":"Blue","item_type":"Phone","description":"x"}"#,
        );

        let record = standardize(&backend, "x", &catalog()).await.unwrap();
        assert_eq!(record.subway_location, vec!["Union Square"]);
        assert_eq!(record.color, vec!["Blue"]);
        assert_eq!(record.item_type, vec!["Phone"]);
    }

    #[tokio::test]
    async fn test_standardize_unparsable_output_falls_back() {
        let backend =
            MockInferenceBackend::new().with_fixed_response("I cannot produce JSON today.");

        let raw = "Description: black umbrella";
        let record = standardize(&backend, raw, &catalog()).await.unwrap();
        assert_eq!(record.description, raw);
        assert!(record.subway_location.is_empty());
        assert!(record.color.is_empty());
        assert!(record.item_type.is_empty());
        assert_eq!(record.item_category, CATEGORY_NONE);
    }

    #[tokio::test]
    async fn test_standardize_invalid_json_falls_back() {
        let backend = MockInferenceBackend::new().with_fixed_response("{not valid json}");

        let record = standardize(&backend, "raw input", &catalog()).await.unwrap();
        assert_eq!(record.description, "raw input");
    }

    #[tokio::test]
    async fn test_standardize_commentary_around_json_is_tolerated() {
        let backend = MockInferenceBackend::new()
            .with_fixed_response("Here you go:\n{\"description\":\"scarf\"}\nAnything else?");

        let record = standardize(&backend, "a scarf", &catalog()).await.unwrap();
        assert_eq!(record.description, "scarf");
    }

    #[tokio::test]
    async fn test_standardize_absent_time_defaults_to_now() {
        let backend =
            MockInferenceBackend::new().with_fixed_response(r#"{"description":"scarf"}"#);

        let record = standardize(&backend, "a scarf", &catalog()).await.unwrap();
        assert!(!record.time.is_empty());
    }

    #[tokio::test]
    async fn test_standardize_generation_failure_propagates() {
        let backend = MockInferenceBackend::new().with_failing_generation();

        let err = standardize(&backend, "anything", &catalog()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_standardize_sends_vocabularies_to_model() {
        let backend =
            MockInferenceBackend::new().with_fixed_response(r#"{"description":"x"}"#);

        standardize(&backend, "x", &catalog()).await.unwrap();
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].input.contains("Union Square"));
        assert!(calls[0].input.contains("Electronics"));
    }
}
