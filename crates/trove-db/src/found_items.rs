//! Found-item repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use trove_core::{
    similarity_from_distance, split_tags, Error, FoundItemRepository, MatchResult, NewFoundItem,
    Result, SearchFilter, Vector,
};

use crate::escape_like;
use crate::vector_literal::to_storage_literal;

/// PostgreSQL implementation of [`FoundItemRepository`].
pub struct PgFoundItemRepository {
    pool: PgPool,
}

impl PgFoundItemRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the filtered nearest-neighbor query.
///
/// `$1` is always the query vector literal and the final parameter is the
/// result limit; the string parameters returned here bind in between, in
/// order. Rows without an embedding cannot be ranked and are excluded.
fn build_search_sql(filter: &SearchFilter) -> (String, Vec<String>) {
    let mut sql = String::from(
        "SELECT id, image_path, subway_location, color, item_category, item_type, description, \
         (embedding <-> $1::vector) AS distance \
         FROM found_items WHERE embedding IS NOT NULL",
    );
    let mut params = Vec::new();
    let mut idx = 1;

    // Exact category match, only when the query carries a category.
    if let Some(category) = &filter.item_category {
        idx += 1;
        sql.push_str(&format!(" AND item_category = ${idx}"));
        params.push(category.clone());
    }

    // Substring predicates over the delimited tag columns, one candidate
    // value per field.
    let like_fields = [
        ("item_type", &filter.item_type),
        ("color", &filter.color),
        ("subway_location", &filter.subway_location),
    ];
    for (column, value) in like_fields {
        if let Some(v) = value {
            idx += 1;
            sql.push_str(&format!(" AND {column} LIKE ${idx}"));
            params.push(format!("%{}%", escape_like(v)));
        }
    }

    idx += 1;
    sql.push_str(&format!(" ORDER BY distance ASC LIMIT ${idx}"));
    (sql, params)
}

#[async_trait]
impl FoundItemRepository for PgFoundItemRepository {
    async fn insert(&self, item: NewFoundItem) -> Result<i64> {
        let embedding_literal = to_storage_literal(&item.embedding);

        let row = sqlx::query(
            "INSERT INTO found_items (
                image_path, subway_location, color, item_category, item_type,
                description, embedding, contact_info
             ) VALUES ($1, $2, $3, $4, $5, $6, $7::vector, $8)
             RETURNING id",
        )
        .bind(&item.image_path)
        .bind(&item.subway_location)
        .bind(&item.color)
        .bind(&item.item_category)
        .bind(&item.item_type)
        .bind(&item.description)
        .bind(&embedding_literal)
        .bind(&item.contact_info)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let id: i64 = row.get("id");
        info!(
            subsystem = "db",
            component = "found_items",
            op = "insert",
            db_table = "found_items",
            id = id,
            "Found item stored"
        );
        Ok(id)
    }

    async fn search(
        &self,
        query_vec: &Vector,
        filter: &SearchFilter,
        k: i64,
    ) -> Result<Vec<MatchResult>> {
        let start = Instant::now();
        let (sql, params) = build_search_sql(filter);
        let embedding_literal = to_storage_literal(query_vec);

        let mut query = sqlx::query(&sql).bind(&embedding_literal);
        for param in &params {
            query = query.bind(param);
        }
        query = query.bind(k);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let results: Vec<MatchResult> = rows
            .into_iter()
            .map(|row| {
                let distance: f64 = row.get("distance");
                let subway_location: String = row.get("subway_location");
                let color: String = row.get("color");
                let item_type: String = row.get("item_type");
                MatchResult {
                    id: row.get("id"),
                    image_path: row.get("image_path"),
                    subway_location: split_tags(&subway_location),
                    color: split_tags(&color),
                    item_category: row.get("item_category"),
                    item_type: split_tags(&item_type),
                    description: row.get("description"),
                    distance,
                    similarity: similarity_from_distance(distance),
                }
            })
            .collect();

        debug!(
            subsystem = "db",
            component = "found_items",
            op = "search",
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tag-filtered vector search complete"
        );
        Ok(results)
    }
}
