//! Workflow configuration.

use std::path::PathBuf;

use trove_core::{Error, Result};
use trove_inference::OpenAIConfig;

/// Default path of the tabular tag source.
pub const DEFAULT_TAGS_PATH: &str = "Tags.csv";

/// Configuration for the intake workflow, assembled from the environment.
///
/// Construction fails fast when a required credential or connection string
/// is absent, so misconfiguration surfaces at startup rather than on the
/// first user action.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Path of the tag catalog CSV.
    pub tags_path: PathBuf,
    /// Inference backend configuration.
    pub openai: OpenAIConfig,
}

impl IntakeConfig {
    /// Build the configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; `TROVE_TAGS_PATH` defaults to
    /// [`DEFAULT_TAGS_PATH`]; the `OPENAI_*` variables follow
    /// [`OpenAIConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".to_string()))?;

        let tags_path = std::env::var("TROVE_TAGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TAGS_PATH));

        Ok(Self {
            database_url,
            tags_path,
            openai: OpenAIConfig::from_env()?,
        })
    }
}
