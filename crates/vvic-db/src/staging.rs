//! Database operations for the `vendor_products` staging table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `vendor_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorProductRow {
    pub id: i64,
    pub item_vid: String,
    /// The vendor's item document, stored verbatim.
    pub raw: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts or overwrites the staged document for `item_vid`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_vendor_product(
    pool: &PgPool,
    item_vid: &str,
    raw: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO vendor_products (item_vid, raw) \
         VALUES ($1, $2) \
         ON CONFLICT (item_vid) DO UPDATE \
         SET raw = EXCLUDED.raw, updated_at = NOW()",
    )
    .bind(item_vid)
    .bind(raw)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the staged row for `item_vid`, or `None` if it was never fetched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_vendor_product(
    pool: &PgPool,
    item_vid: &str,
) -> Result<Option<VendorProductRow>, DbError> {
    let row = sqlx::query_as::<_, VendorProductRow>(
        "SELECT id, item_vid, raw, created_at, updated_at \
         FROM vendor_products \
         WHERE item_vid = $1",
    )
    .bind(item_vid)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every staged `item_vid` in staging order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_vendor_item_vids(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>("SELECT item_vid FROM vendor_products ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
