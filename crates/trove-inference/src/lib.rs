//! # trove-inference
//!
//! Inference backend abstraction for the trove lost-and-found pipeline.
//!
//! This crate provides:
//! - An OpenAI-compatible implementation of the embedding and generation
//!   traits from `trove-core`
//! - The fixed system-instruction prompt set for the intake workflow
//! - A deterministic mock backend (feature `mock`) for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use trove_inference::OpenAIBackend;
//! use trove_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let texts = vec!["black backpack".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//!     assert_eq!(embeddings.len(), 1);
//! }
//! ```

pub mod openai;
pub mod prompts;

// Mock inference backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use openai::{OpenAIBackend, OpenAIConfig};
pub use prompts::{
    standardizer_user_prompt, OPERATOR_SYSTEM_PROMPT, REPORTER_SYSTEM_PROMPT,
    STANDARDIZER_SYSTEM_PROMPT,
};
