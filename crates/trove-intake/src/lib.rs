//! # trove-intake
//!
//! Intake and match workflow for the trove lost-and-found pipeline.
//!
//! This crate provides:
//! - The tag catalog loader (controlled vocabulary snapshot)
//! - The record standardizer (free text → canonical record, with fallback)
//! - [`IntakeService`], wiring generation, embeddings, and storage behind
//!   injected handles for the operator and reporter flows
//! - Contact validation and report-merging helpers
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trove_intake::{catalog::load_catalog, IntakeConfig, IntakeService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntakeConfig::from_env()?;
//!     let catalog = load_catalog(&config.tags_path)?;
//!     let pool = trove_db::create_pool(&config.database_url).await?;
//!     let backend = Arc::new(trove_inference::OpenAIBackend::new(config.openai)?);
//!     let repo = Arc::new(trove_db::PgFoundItemRepository::new(pool));
//!     let service = IntakeService::new(backend.clone(), backend, repo, catalog);
//!
//!     let record = service.standardize("Color: Blue\nItem Type: Phone").await?;
//!     let matches = service.search_matches(&record, 5).await?;
//!     println!("{} matches", matches.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod helpers;
pub mod service;
pub mod standardize;

pub use catalog::load_catalog;
pub use config::IntakeConfig;
pub use helpers::{validate_email, validate_phone, ReportChoices};
pub use service::{IntakeService, DEFAULT_MATCH_COUNT};
pub use standardize::standardize;
