//! Tag catalog loader.
//!
//! The controlled vocabularies live in a tabular reference file with one
//! row per known tag value. The file is treated as immutable for the
//! process lifetime; load it once at startup and pass the snapshot around.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use trove_core::{Error, Result, TagCatalog};

/// Required header columns of the tag source, in no particular order.
pub const COLUMN_LOCATION: &str = "Subway Location";
pub const COLUMN_COLOR: &str = "Color";
pub const COLUMN_CATEGORY: &str = "Item Category";
pub const COLUMN_ITEM_TYPE: &str = "Item Type";

/// Load the tag catalog from a CSV file.
///
/// Each required column is extracted, trimmed, blank-filtered,
/// deduplicated, and sorted. Duplicates and blank cells in the source are
/// tolerated; a missing file or missing column is a catalog error.
pub fn load_catalog(path: &Path) -> Result<TagCatalog> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Catalog(format!("Cannot read {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Catalog(format!("Cannot read header row: {}", e)))?
        .clone();

    let column_index = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Catalog(format!("Missing column '{}'", name)))
    };

    let location_idx = column_index(COLUMN_LOCATION)?;
    let color_idx = column_index(COLUMN_COLOR)?;
    let category_idx = column_index(COLUMN_CATEGORY)?;
    let item_type_idx = column_index(COLUMN_ITEM_TYPE)?;

    let mut locations = BTreeSet::new();
    let mut colors = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut item_types = BTreeSet::new();

    for record in reader.records() {
        let record = record.map_err(|e| Error::Catalog(format!("Bad row: {}", e)))?;
        let mut collect = |idx: usize, set: &mut BTreeSet<String>| {
            if let Some(value) = record.get(idx) {
                let value = value.trim();
                if !value.is_empty() {
                    set.insert(value.to_string());
                }
            }
        };
        collect(location_idx, &mut locations);
        collect(color_idx, &mut colors);
        collect(category_idx, &mut categories);
        collect(item_type_idx, &mut item_types);
    }

    let catalog = TagCatalog {
        locations: locations.into_iter().collect(),
        colors: colors.into_iter().collect(),
        categories: categories.into_iter().collect(),
        item_types: item_types.into_iter().collect(),
    };

    info!(
        subsystem = "intake",
        component = "catalog",
        op = "load",
        locations = catalog.locations.len(),
        colors = catalog.colors.len(),
        categories = catalog.categories.len(),
        item_types = catalog.item_types.len(),
        "Tag catalog loaded"
    );
    Ok(catalog)
}
