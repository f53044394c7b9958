//! Core data models for the trove lost-and-found pipeline.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Re-export the pgvector type so consumers don't need a direct dependency.
pub use pgvector::Vector;

/// Dimensionality of description embeddings (text-embedding-3-small).
pub const EMBEDDING_DIM: usize = 1536;

/// Delimiter used to flatten multi-valued tag fields into a text column.
///
/// Known limitation: a tag value containing the delimiter is ambiguous on
/// retrieval. The flat format is preserved for compatibility with the
/// existing store.
pub const TAG_DELIMITER: char = ',';

// =============================================================================
// TAG CATALOG
// =============================================================================

/// Immutable snapshot of the controlled vocabularies used for
/// standardization. Loaded once per process lifetime, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagCatalog {
    /// Known subway locations, sorted and deduplicated.
    pub locations: Vec<String>,
    /// Known colors.
    pub colors: Vec<String>,
    /// Known item categories.
    pub categories: Vec<String>,
    /// Known item types.
    pub item_types: Vec<String>,
}

impl TagCatalog {
    /// True if every vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.colors.is_empty()
            && self.categories.is_empty()
            && self.item_types.is_empty()
    }
}

// =============================================================================
// CANONICAL RECORD
// =============================================================================

/// Sentinel used for an absent item category.
///
/// The literal string "null" (not JSON null) matches the text semantics of
/// the stored rows.
pub const CATEGORY_NONE: &str = "null";

/// The standardized representation of an item, found or lost.
///
/// Invariant: after standardization every list-typed field is a vector,
/// never a bare string, so downstream consumers can assume a type-stable
/// shape regardless of what the model emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub subway_location: Vec<String>,
    pub color: Vec<String>,
    pub item_category: String,
    pub item_type: Vec<String>,
    pub description: String,
    /// ISO-8601 UTC timestamp; defaulted to standardization time when the
    /// source omitted it.
    pub time: String,
}

impl CanonicalRecord {
    /// Fallback shape used when the model output could not be parsed.
    ///
    /// List fields empty, category absent, the raw input preserved verbatim
    /// as the description.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            subway_location: Vec::new(),
            color: Vec::new(),
            item_category: CATEGORY_NONE.to_string(),
            item_type: Vec::new(),
            description: raw_text.to_string(),
            time: now_timestamp(),
        }
    }

    /// Build a record from an untrusted JSON object emitted by the model.
    ///
    /// Normalization rules: a bare string in a list field becomes a
    /// one-element vector; absent list fields default to empty; an absent
    /// category defaults to [`CATEGORY_NONE`]; an absent or empty `time`
    /// gets the current UTC timestamp.
    pub fn from_model_json(value: &Value) -> Self {
        let item_category = value
            .get("item_category")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(CATEGORY_NONE)
            .to_string();

        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let time = match value.get("time").and_then(Value::as_str) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => now_timestamp(),
        };

        Self {
            subway_location: string_or_list(value.get("subway_location")),
            color: string_or_list(value.get("color")),
            item_category,
            item_type: string_or_list(value.get("item_type")),
            description,
            time,
        }
    }

    /// Derive the search predicates for this record.
    ///
    /// Only the first element of each multi-valued field participates in
    /// filtering; an empty sequence imposes no constraint. The category
    /// filter applies only when a category is actually present.
    pub fn search_filter(&self) -> SearchFilter {
        let item_category = if self.item_category.is_empty() || self.item_category == CATEGORY_NONE
        {
            None
        } else {
            Some(self.item_category.clone())
        };

        SearchFilter {
            item_category,
            item_type: self.item_type.first().cloned(),
            color: self.color.first().cloned(),
            subway_location: self.subway_location.first().cloned(),
        }
    }
}

/// Normalize a JSON value into a list of strings.
///
/// Bare string → one-element vector; array → string elements in order;
/// anything else (including absence and JSON null) → empty vector.
fn string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Current UTC time as an ISO-8601 string.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

// =============================================================================
// DELIMITED TAG FIELDS
// =============================================================================

/// Join a list field into its flat stored representation.
pub fn join_tags(values: &[String]) -> String {
    values.join(&TAG_DELIMITER.to_string())
}

/// Re-split a stored delimited field into a sequence.
///
/// An empty stored string yields an empty vector, not `[""]`.
pub fn split_tags(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        Vec::new()
    } else {
        stored.split(TAG_DELIMITER).map(String::from).collect()
    }
}

// =============================================================================
// PERSISTED ROWS AND SEARCH RESULTS
// =============================================================================

/// A found-item row ready for insertion: canonical fields flattened plus
/// provenance metadata and the description embedding.
#[derive(Debug, Clone)]
pub struct NewFoundItem {
    pub image_path: String,
    pub subway_location: String,
    pub color: String,
    pub item_category: String,
    pub item_type: String,
    pub description: String,
    pub embedding: Vector,
    pub contact_info: String,
}

impl NewFoundItem {
    /// Flatten a canonical record for storage.
    pub fn from_record(
        record: &CanonicalRecord,
        embedding: Vector,
        contact_info: &str,
        image_path: &str,
    ) -> Self {
        Self {
            image_path: image_path.to_string(),
            subway_location: join_tags(&record.subway_location),
            color: join_tags(&record.color),
            item_category: record.item_category.clone(),
            item_type: join_tags(&record.item_type),
            description: record.description.clone(),
            embedding,
            contact_info: contact_info.to_string(),
        }
    }
}

/// Exact/substring predicates applied before nearest-neighbor ranking.
///
/// `None` for a field imposes no constraint on that field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub item_category: Option<String>,
    pub item_type: Option<String>,
    pub color: Option<String>,
    pub subway_location: Option<String>,
}

impl SearchFilter {
    /// True if no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.item_category.is_none()
            && self.item_type.is_none()
            && self.color.is_none()
            && self.subway_location.is_none()
    }
}

/// One ranked search hit, with delimited fields re-split into sequences.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub id: i64,
    pub image_path: String,
    pub subway_location: Vec<String>,
    pub color: Vec<String>,
    pub item_category: String,
    pub item_type: Vec<String>,
    pub description: String,
    /// L2 distance between the stored and query embeddings; lower = closer.
    pub distance: f64,
    /// Derived score in (0, 1], higher = closer.
    pub similarity: f64,
}

/// Convert a vector distance to a similarity score.
///
/// Monotonically decreasing in distance and bounded in (0, 1];
/// `similarity(0) == 1.0`.
pub fn similarity_from_distance(distance: f64) -> f64 {
    1.0 / (1.0 + distance)
}
