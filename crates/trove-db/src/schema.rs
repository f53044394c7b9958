//! Schema bootstrap for the found-items store.

use sqlx::PgPool;
use tracing::info;

use trove_core::{Error, Result, EMBEDDING_DIM};

/// Enable the vector extension and create the `found_items` table if it
/// does not exist. Idempotent; safe to run at every startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(pool)
        .await
        .map_err(Error::Database)?;

    let create_table = format!(
        "CREATE TABLE IF NOT EXISTS found_items (
            id BIGSERIAL PRIMARY KEY,
            image_path TEXT NOT NULL DEFAULT '',
            subway_location TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT '',
            item_category TEXT NOT NULL DEFAULT 'null',
            item_type TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            embedding VECTOR({EMBEDDING_DIM}),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            contact_info TEXT NOT NULL DEFAULT ''
        )"
    );

    sqlx::query(&create_table)
        .execute(pool)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "schema",
        op = "init",
        db_table = "found_items",
        "Schema initialized"
    );
    Ok(())
}
