//! Database operations for `sku_specs`, `sku_prices` and `sku_inventory`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vvic_core::{NewSku, SkuContent, SkuInventory, SkuPrice};

use crate::{to_json, DbError};

/// A row from the `sku_specs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SkuSpecRow {
    pub id: i64,
    pub listing_id: i64,
    pub id_by_vendor: String,
    pub title: String,
    pub images: serde_json::Value,
    pub spec: String,
    pub key: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sets every SKU of a listing offline. Returns how many rows changed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn offline_skus(pool: &PgPool, listing_id: i64) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE sku_specs SET status = 0, updated_at = NOW() WHERE listing_id = $1",
    )
    .bind(listing_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Returns the id of the SKU imported from vendor SKU `id_by_vendor` under
/// `listing_id`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_sku_id(
    pool: &PgPool,
    listing_id: i64,
    id_by_vendor: &str,
) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM sku_specs WHERE listing_id = $1 AND id_by_vendor = $2",
    )
    .bind(listing_id)
    .bind(id_by_vendor)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// Returns all SKUs of a listing, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_listing_skus(pool: &PgPool, listing_id: i64) -> Result<Vec<SkuSpecRow>, DbError> {
    let rows = sqlx::query_as::<_, SkuSpecRow>(
        "SELECT id, listing_id, id_by_vendor, title, images, spec, key, status, \
                created_at, updated_at \
         FROM sku_specs \
         WHERE listing_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a new SKU. Returns `false` if the vendor SKU is already stored
/// under the same listing.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if the image list cannot be encoded, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sku(pool: &PgPool, sku: &NewSku) -> Result<bool, DbError> {
    let content = &sku.content;
    let result = sqlx::query(
        "INSERT INTO sku_specs ( \
             id, listing_id, id_by_vendor, title, images, spec, key, status, \
             store_id, vendor_id, store_category_id \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (listing_id, id_by_vendor) DO NOTHING",
    )
    .bind(sku.id)
    .bind(sku.listing_id)
    .bind(&sku.id_by_vendor)
    .bind(&content.title)
    .bind(to_json("sku images", &content.images)?)
    .bind(&content.spec)
    .bind(&content.key)
    .bind(content.status)
    .bind(sku.store_id)
    .bind(sku.vendor_id)
    .bind(sku.store_category_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites the vendor-derived content of an existing SKU.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if the image list cannot be encoded, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_sku(
    pool: &PgPool,
    sku_id: i64,
    id_by_vendor: &str,
    content: &SkuContent,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE sku_specs \
         SET title = $3, images = $4, spec = $5, key = $6, status = $7, updated_at = NOW() \
         WHERE id = $1 AND id_by_vendor = $2",
    )
    .bind(sku_id)
    .bind(id_by_vendor)
    .bind(&content.title)
    .bind(to_json("sku images", &content.images)?)
    .bind(&content.spec)
    .bind(&content.key)
    .bind(content.status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Inserts the `(sku_id, region)` price or overwrites both prices.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_sku_price(pool: &PgPool, price: &SkuPrice) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO sku_prices (sku_id, listing_id, region, sale_price, list_price, deal_enabled) \
         VALUES ($1, $2, $3, $4, $5, false) \
         ON CONFLICT (sku_id, region) DO UPDATE \
         SET sale_price = EXCLUDED.sale_price, \
             list_price = EXCLUDED.list_price, \
             updated_at = NOW()",
    )
    .bind(price.sku_id)
    .bind(price.listing_id)
    .bind(price.region)
    .bind(price.sale_price)
    .bind(price.list_price)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Inserts the inventory row of a new SKU. Returns `false` if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sku_inventory(
    pool: &PgPool,
    inventory: &SkuInventory,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO sku_inventory (sku_id, listing_id, warehouse_id, vendor_id, stock, reservation) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (sku_id) DO NOTHING",
    )
    .bind(inventory.sku_id)
    .bind(inventory.listing_id)
    .bind(inventory.warehouse_id)
    .bind(inventory.vendor_id)
    .bind(inventory.stock)
    .bind(inventory.reservation)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
