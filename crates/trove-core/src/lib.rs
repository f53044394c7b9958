//! # trove-core
//!
//! Core types, traits, and abstractions for the trove lost-and-found
//! pipeline.
//!
//! This crate provides the foundational data structures (tag catalog,
//! canonical record, search results) and the trait seams (generation,
//! embedding, storage) that the other trove crates depend on.

pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
