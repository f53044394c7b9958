//! # trove-db
//!
//! PostgreSQL + pgvector storage layer for the trove lost-and-found
//! pipeline.
//!
//! This crate provides:
//! - Connection pool management
//! - Schema bootstrap for the `found_items` table
//! - The pgvector storage-literal codec
//! - The found-item repository (insert-with-returning-id, tag-filtered
//!   nearest-neighbor search)
//!
//! ## Example
//!
//! ```rust,ignore
//! use trove_db::{create_pool, init_schema, PgFoundItemRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/trove").await?;
//!     init_schema(&pool).await?;
//!     let items = PgFoundItemRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod found_items;
pub mod pool;
pub mod schema;
pub mod vector_literal;

pub use found_items::PgFoundItemRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use schema::init_schema;
pub use vector_literal::{parse_storage_literal, to_storage_literal};

// Re-export core types
pub use trove_core::*;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
