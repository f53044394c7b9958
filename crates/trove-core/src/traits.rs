//! Core traits for trove abstractions.
//!
//! These traits define the seams between the workflow and its external
//! collaborators (text generation, embeddings, storage), enabling pluggable
//! backends and testability. External services are explicitly constructed
//! and passed in; there are no ambient singletons.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{MatchResult, NewFoundItem, SearchFilter, Vector};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts, one vector per input.
    ///
    /// An empty input string is valid and must still produce a vector.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with a system instruction.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for persisted found items.
///
/// Rows are created once on insert and never updated or deleted by this
/// pipeline.
#[async_trait]
pub trait FoundItemRepository: Send + Sync {
    /// Persist a found item, returning the server-assigned id.
    ///
    /// The write is a single statement: either the full row is committed or
    /// nothing is.
    async fn insert(&self, item: NewFoundItem) -> Result<i64>;

    /// Tag-filtered nearest-neighbor search.
    ///
    /// Applies the filter predicates, ranks the qualifying rows by L2
    /// distance to `query_vec` ascending, and returns at most `k` results.
    /// Fewer than `k` qualifying rows return all of them.
    async fn search(
        &self,
        query_vec: &Vector,
        filter: &SearchFilter,
        k: i64,
    ) -> Result<Vec<MatchResult>>;
}
