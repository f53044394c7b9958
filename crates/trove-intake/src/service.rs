//! The intake and match workflow.
//!
//! [`IntakeService`] wires the generation backend, embedding backend, and
//! found-item repository together behind explicit, injected handles. Each
//! user action is a synchronous sequence of at most one model call, one
//! embedding call, and one storage round trip; nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use trove_core::{
    CanonicalRecord, EmbeddingBackend, Error, FoundItemRepository, GenerationBackend, MatchResult,
    NewFoundItem, Result, TagCatalog, Vector,
};
use trove_inference::{OPERATOR_SYSTEM_PROMPT, REPORTER_SYSTEM_PROMPT};

use crate::helpers::{is_structured_record, merge_report, ReportChoices};
use crate::standardize::standardize;

/// Default number of matches returned to a lost-item reporter.
pub const DEFAULT_MATCH_COUNT: i64 = 5;

/// The intake workflow service.
///
/// Owns no mutable state of its own; consistency across concurrent
/// insert/search interleavings is delegated to the storage engine.
pub struct IntakeService {
    generation: Arc<dyn GenerationBackend>,
    embedding: Arc<dyn EmbeddingBackend>,
    items: Arc<dyn FoundItemRepository>,
    catalog: TagCatalog,
}

impl IntakeService {
    /// Create a new service from injected dependencies.
    pub fn new(
        generation: Arc<dyn GenerationBackend>,
        embedding: Arc<dyn EmbeddingBackend>,
        items: Arc<dyn FoundItemRepository>,
        catalog: TagCatalog,
    ) -> Self {
        Self {
            generation,
            embedding,
            items,
            catalog,
        }
    }

    /// The catalog snapshot this service standardizes against.
    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Operator flow, step one: describe a found item from intake context
    /// (photo caption, operator notes) as a `Field: value` block.
    pub async fn describe_found_item(&self, context: &str) -> Result<String> {
        self.generation
            .generate_with_system(OPERATOR_SYSTEM_PROMPT, context)
            .await
    }

    /// Standardize a raw textual record against the catalog.
    pub async fn standardize(&self, raw_text: &str) -> Result<CanonicalRecord> {
        standardize(self.generation.as_ref(), raw_text, &self.catalog).await
    }

    /// Operator flow, step two: persist a standardized found item.
    ///
    /// Embeds the description, flattens the record, and writes a single
    /// row. Embedding and persistence failures stay distinguishable
    /// ([`Error::Embedding`] vs [`Error::Database`]); neither leaves a
    /// partial row behind.
    pub async fn insert_found(
        &self,
        record: &CanonicalRecord,
        contact: &str,
        image_path: &str,
    ) -> Result<i64> {
        let embedding = self.embed_one(&record.description).await?;
        let item = NewFoundItem::from_record(record, embedding, contact, image_path);
        let id = self.items.insert(item).await?;

        info!(
            subsystem = "intake",
            component = "store",
            op = "insert_found",
            id = id,
            "Found item recorded"
        );
        Ok(id)
    }

    /// User flow: rank stored found items against a lost-item record.
    ///
    /// Errors are observably distinct from zero-result success: an
    /// embedding or storage failure propagates instead of collapsing into
    /// an empty result sequence.
    pub async fn search_matches(
        &self,
        query: &CanonicalRecord,
        k: i64,
    ) -> Result<Vec<MatchResult>> {
        if k < 1 {
            return Err(Error::InvalidInput(format!("k must be >= 1, got {}", k)));
        }

        let start = Instant::now();
        let query_vec = self.embed_one(&query.description).await?;
        let results = self
            .items
            .search(&query_vec, &query.search_filter(), k)
            .await?;

        info!(
            subsystem = "intake",
            component = "matcher",
            op = "search",
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Match search complete"
        );
        Ok(results)
    }

    /// User flow, end to end: structure a lost-item report, merge in any
    /// explicit quick-info choices, and standardize the merged record.
    ///
    /// The returned record is not persisted; it is the search query for
    /// [`search_matches`](Self::search_matches).
    pub async fn report_lost(
        &self,
        context: &str,
        choices: &ReportChoices,
    ) -> Result<CanonicalRecord> {
        let model_text = self
            .generation
            .generate_with_system(REPORTER_SYSTEM_PROMPT, context)
            .await?;

        if !is_structured_record(&model_text) {
            warn!(
                subsystem = "intake",
                component = "reporter",
                response_len = model_text.len(),
                "Model did not emit a structured record"
            );
            return Err(Error::Generation(
                "model did not emit a structured record".to_string(),
            ));
        }

        let merged = merge_report(&model_text, choices);
        self.standardize(&merged).await
    }

    async fn embed_one(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embedding.embed_texts(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(Error::Embedding(
                "embedding backend returned no vector".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use trove_core::{
        join_tags, similarity_from_distance, split_tags, SearchFilter, CATEGORY_NONE,
    };
    use trove_inference::mock::MockInferenceBackend;

    /// In-memory stand-in for the Postgres repository, mirroring its
    /// predicate and ranking semantics with a linear scan.
    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<Vec<(i64, NewFoundItem)>>,
    }

    impl MemoryRepository {
        fn matches(item: &NewFoundItem, filter: &SearchFilter) -> bool {
            if let Some(category) = &filter.item_category {
                if &item.item_category != category {
                    return false;
                }
            }
            let contains = |stored: &str, wanted: &Option<String>| match wanted {
                Some(v) => stored.contains(v.as_str()),
                None => true,
            };
            contains(&item.item_type, &filter.item_type)
                && contains(&item.color, &filter.color)
                && contains(&item.subway_location, &filter.subway_location)
        }

        fn l2(a: &Vector, b: &Vector) -> f64 {
            a.as_slice()
                .iter()
                .zip(b.as_slice())
                .map(|(x, y)| (f64::from(x - y)).powi(2))
                .sum::<f64>()
                .sqrt()
        }
    }

    #[async_trait]
    impl FoundItemRepository for MemoryRepository {
        async fn insert(&self, item: NewFoundItem) -> Result<i64> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            rows.push((id, item));
            Ok(id)
        }

        async fn search(
            &self,
            query_vec: &Vector,
            filter: &SearchFilter,
            k: i64,
        ) -> Result<Vec<MatchResult>> {
            let rows = self.rows.lock().unwrap();
            let mut hits: Vec<MatchResult> = rows
                .iter()
                .filter(|(_, item)| Self::matches(item, filter))
                .map(|(id, item)| {
                    let distance = Self::l2(&item.embedding, query_vec);
                    MatchResult {
                        id: *id,
                        image_path: item.image_path.clone(),
                        subway_location: split_tags(&item.subway_location),
                        color: split_tags(&item.color),
                        item_category: item.item_category.clone(),
                        item_type: split_tags(&item.item_type),
                        description: item.description.clone(),
                        distance,
                        similarity: similarity_from_distance(distance),
                    }
                })
                .collect();
            hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            hits.truncate(k as usize);
            Ok(hits)
        }
    }

    fn catalog() -> TagCatalog {
        TagCatalog {
            locations: vec!["Union Square".into()],
            colors: vec!["Black".into(), "Blue".into()],
            categories: vec!["Bags".into(), "Electronics".into()],
            item_types: vec!["Backpack".into(), "Phone".into()],
        }
    }

    fn record(description: &str, category: &str, colors: &[&str]) -> CanonicalRecord {
        CanonicalRecord {
            subway_location: vec!["Union Square".into()],
            color: colors.iter().map(|s| s.to_string()).collect(),
            item_category: category.to_string(),
            item_type: vec![],
            description: description.to_string(),
            time: trove_core::now_timestamp(),
        }
    }

    fn service_with(backend: MockInferenceBackend) -> (IntakeService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::default());
        let backend = Arc::new(backend);
        let service = IntakeService::new(
            backend.clone(),
            backend,
            repo.clone(),
            catalog(),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn test_insert_then_search_finds_identical_description() {
        let (service, _) = service_with(MockInferenceBackend::new());

        let found = record("blue phone with cracked screen", "Electronics", &["Blue"]);
        let id = service.insert_found(&found, "5551234567", "").await.unwrap();

        // Identical description embeds identically, so the inserted row
        // ranks first with similarity 1.0.
        let lost = record("blue phone with cracked screen", "Electronics", &["Blue"]);
        let results = service.search_matches(&lost, 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, id);
        assert!(results[0].distance < 1e-6);
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_returns_all_rows_when_k_exceeds_matches() {
        let (service, _) = service_with(MockInferenceBackend::new());

        service
            .insert_found(&record("blue phone", "Electronics", &["Blue"]), "", "")
            .await
            .unwrap();
        service
            .insert_found(&record("black backpack", "Bags", &["Black"]), "", "")
            .await
            .unwrap();

        let mut query = record("some item", CATEGORY_NONE, &[]);
        query.subway_location.clear();
        let results = service.search_matches(&query, 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn test_null_category_imposes_no_filter() {
        let (service, _) = service_with(MockInferenceBackend::new());

        service
            .insert_found(&record("blue phone", "Electronics", &["Blue"]), "", "")
            .await
            .unwrap();
        service
            .insert_found(&record("black backpack", "Bags", &["Black"]), "", "")
            .await
            .unwrap();

        let mut query = record("anything", CATEGORY_NONE, &[]);
        query.subway_location = vec!["Union Square".into()];
        let results = service.search_matches(&query, 10).await.unwrap();

        let categories: Vec<&str> = results.iter().map(|r| r.item_category.as_str()).collect();
        assert!(categories.contains(&"Electronics"));
        assert!(categories.contains(&"Bags"));
    }

    #[tokio::test]
    async fn test_category_filter_restricts_results() {
        let (service, _) = service_with(MockInferenceBackend::new());

        service
            .insert_found(&record("blue phone", "Electronics", &["Blue"]), "", "")
            .await
            .unwrap();
        service
            .insert_found(&record("black backpack", "Bags", &["Black"]), "", "")
            .await
            .unwrap();

        let query = record("lost my phone", "Electronics", &[]);
        let results = service.search_matches(&query, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item_category, "Electronics");
    }

    #[tokio::test]
    async fn test_search_rejects_nonpositive_k() {
        let (service, _) = service_with(MockInferenceBackend::new());
        let err = service
            .search_matches(&record("x", CATEGORY_NONE, &[]), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_distinct_from_no_matches() {
        let (service, _) = service_with(MockInferenceBackend::new().with_failing_embedding());
        let err = service
            .search_matches(&record("x", CATEGORY_NONE, &[]), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_insert_embedding_failure_writes_nothing() {
        let (service, repo) = service_with(MockInferenceBackend::new().with_failing_embedding());
        let err = service
            .insert_found(&record("x", "Bags", &[]), "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_lost_merges_choices_and_standardizes() {
        let backend = MockInferenceBackend::new()
            // Reporter call sees the raw context; standardizer call sees the
            // merged Field: value block.
            .with_response_mapping(
                "lost my backpack",
                "You lost a backpack.\nSubway Location: Central\nColor: Black\n\
                 Item Category: Bags\nItem Type: Backpack\nDescription: black backpack\n",
            )
            .with_response_mapping(
                "Record to standardize",
                r#"{"subway_location":["Union Square"],"color":["Black"],
                    "item_category":"Bags","item_type":["Backpack"],
                    "description":"black backpack"}"#,
            );
        let (service, _) = service_with(backend);

        let choices = ReportChoices {
            location: Some("Union Square".to_string()),
            ..Default::default()
        };
        let record = service
            .report_lost("I lost my backpack", &choices)
            .await
            .unwrap();
        assert_eq!(record.item_category, "Bags");
        assert_eq!(record.subway_location, vec!["Union Square"]);
    }

    #[tokio::test]
    async fn test_describe_found_item_delegates_to_generation() {
        let backend = MockInferenceBackend::new()
            .with_fixed_response("A black backpack.\nItem Category: Bags\nColor: Black");
        let (service, _) = service_with(backend);

        let block = service.describe_found_item("photo of a backpack").await.unwrap();
        assert!(is_structured_record(&block));
        assert!(block.contains("Item Category: Bags"));
    }

    #[tokio::test]
    async fn test_report_lost_unstructured_output_is_generation_error() {
        let backend =
            MockInferenceBackend::new().with_fixed_response("Sorry, could you tell me more?");
        let (service, _) = service_with(backend);

        let err = service
            .report_lost("hello", &ReportChoices::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_insert_found_flattens_lists_for_storage() {
        let (service, repo) = service_with(MockInferenceBackend::new());

        let found = record("striped scarf", "Bags", &["Blue", "Red"]);
        service.insert_found(&found, "5551234567", "img.jpg").await.unwrap();

        let rows = repo.rows.lock().unwrap();
        assert_eq!(rows[0].1.color, join_tags(&found.color));
        assert_eq!(rows[0].1.color, "Blue,Red");
        assert_eq!(rows[0].1.contact_info, "5551234567");
        assert_eq!(rows[0].1.image_path, "img.jpg");
    }
}
