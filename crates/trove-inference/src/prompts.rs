//! Fixed system instructions for the intake workflow.
//!
//! The original workflow grew several divergent chat variants; they collapse
//! here into prompt constants consumed through one [`GenerationBackend`]
//! contract. Variant behavior is configuration data, not branching code.
//!
//! [`GenerationBackend`]: trove_core::GenerationBackend

use trove_core::TagCatalog;

/// System instruction for the operator-side intake chat.
///
/// Asks the model to describe a found item and emit a `Field: value` block
/// suitable for standardization.
pub const OPERATOR_SYSTEM_PROMPT: &str = "\
You are an assistant helping a subway worker record found items. \
Describe the item factually based on the provided photo or notes. \
After the description, emit a block of lines in the exact form \
`Field: value` for these fields: Subway Location, Color, Item Category, \
Item Type, Description. Leave a field blank when it is unknown. \
Do not invent details that are not visible.";

/// System instruction for the user-side lost-item report chat.
pub const REPORTER_SYSTEM_PROMPT: &str = "\
You help users report lost items. Restate what the user lost as a short \
factual description, then emit a block of lines in the exact form \
`Field: value` for these fields: Subway Location, Color, Item Category, \
Item Type, Description. Leave a field blank when the user did not say. \
Do not invent details.";

/// System instruction for the standardizer.
///
/// The model must emit exactly one JSON object using the canonical raw
/// field names; everything around it is tolerated and stripped by the
/// parser.
pub const STANDARDIZER_SYSTEM_PROMPT: &str = "\
You map a free-text item record to a controlled vocabulary. \
Respond with a SINGLE JSON object and nothing else, using exactly these \
keys: subway_location, color, item_category, item_type, description, time. \
subway_location, color, and item_type are arrays of strings chosen only \
from the candidate lists supplied in the prompt; item_category is a single \
string from its candidate list or \"null\" when nothing matches; \
description is a concise free-text summary; time is an ISO-8601 UTC \
timestamp or an empty string when unknown. Use empty arrays when no \
candidate matches.";

/// Build the user prompt for a standardization call: the four closed
/// candidate lists followed by the record to standardize.
pub fn standardizer_user_prompt(catalog: &TagCatalog, raw_text: &str) -> String {
    format!(
        "Candidate subway_location values: {}\n\
         Candidate color values: {}\n\
         Candidate item_category values: {}\n\
         Candidate item_type values: {}\n\n\
         Record to standardize:\n{}",
        catalog.locations.join(", "),
        catalog.colors.join(", "),
        catalog.categories.join(", "),
        catalog.item_types.join(", "),
        raw_text
    )
}
