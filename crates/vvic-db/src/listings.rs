//! Database operations for `listings`, plus the category lookups the
//! importer needs while writing them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vvic_core::{ListingAggregates, ListingContent, NewListing, StoreCounter};

use crate::{to_json, DbError};

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub id_by_vendor: String,
    pub title: String,
    pub images: serde_json::Value,
    pub specs: serde_json::Value,
    pub package: serde_json::Value,
    pub category_id: i64,
    pub category_name: String,
    pub status: i16,
    /// Region id (as text) to price.
    pub min_price: serde_json::Value,
    pub max_price: serde_json::Value,
    pub min_list_price: serde_json::Value,
    pub max_list_price: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const LISTING_COLUMNS: &str = "id, id_by_vendor, title, images, specs, package, category_id, \
     category_name, status, min_price, max_price, min_list_price, max_list_price, \
     created_at, updated_at";

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Returns the listing imported from vendor item `id_by_vendor`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_listing_by_vendor_id(
    pool: &PgPool,
    id_by_vendor: &str,
) -> Result<Option<ListingRow>, DbError> {
    let row = sqlx::query_as::<_, ListingRow>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id_by_vendor = $1"
    ))
    .bind(id_by_vendor)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new listing. Returns `false` if a listing for the same vendor
/// item already exists.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a JSON column cannot be encoded, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_listing(pool: &PgPool, listing: &NewListing) -> Result<bool, DbError> {
    let content = &listing.content;
    let result = sqlx::query(
        "INSERT INTO listings ( \
             id, id_by_vendor, title, description, images, specs, unit, package, regions, \
             locations, category_id, category_name, store_id, vendor_id, store_category_id, \
             spu_id, thing_id, status \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         ON CONFLICT (id_by_vendor) DO NOTHING",
    )
    .bind(listing.id)
    .bind(&listing.id_by_vendor)
    .bind(&content.title)
    .bind(&content.desc)
    .bind(to_json("listing images", &content.images)?)
    .bind(to_json("listing specs", &content.specs)?)
    .bind(&content.unit)
    .bind(to_json("listing package", &content.package)?)
    .bind(to_json("listing regions", &content.regions)?)
    .bind(to_json("listing locations", &listing.locations)?)
    .bind(content.category_id)
    .bind(&content.category_name)
    .bind(content.store_id)
    .bind(listing.vendor_id)
    .bind(listing.store_category_id)
    .bind(listing.spu_id)
    .bind(listing.thing_id)
    .bind(content.status.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites the vendor-derived content of an existing listing.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a JSON column cannot be encoded, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_listing_content(
    pool: &PgPool,
    listing_id: i64,
    id_by_vendor: &str,
    content: &ListingContent,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE listings \
         SET title = $3, description = $4, images = $5, specs = $6, unit = $7, package = $8, \
             regions = $9, category_id = $10, category_name = $11, store_id = $12, \
             status = $13, updated_at = NOW() \
         WHERE id = $1 AND id_by_vendor = $2",
    )
    .bind(listing_id)
    .bind(id_by_vendor)
    .bind(&content.title)
    .bind(&content.desc)
    .bind(to_json("listing images", &content.images)?)
    .bind(to_json("listing specs", &content.specs)?)
    .bind(&content.unit)
    .bind(to_json("listing package", &content.package)?)
    .bind(to_json("listing regions", &content.regions)?)
    .bind(content.category_id)
    .bind(&content.category_name)
    .bind(content.store_id)
    .bind(content.status.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Writes region price bounds and, when `online` is set, the online status.
///
/// Price maps are merged per region, so other regions keep their values.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_listing_aggregates(
    pool: &PgPool,
    listing_id: i64,
    aggregates: &ListingAggregates,
) -> Result<bool, DbError> {
    let region = aggregates.region.to_string();

    let result = if let Some(prices) = aggregates.prices {
        sqlx::query(
            "UPDATE listings \
             SET min_price = min_price || jsonb_build_object($2::text, $3::bigint), \
                 max_price = max_price || jsonb_build_object($2::text, $4::bigint), \
                 min_list_price = min_list_price || jsonb_build_object($2::text, $5::bigint), \
                 max_list_price = max_list_price || jsonb_build_object($2::text, $6::bigint), \
                 status = CASE WHEN $7 THEN 1 ELSE status END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(listing_id)
        .bind(&region)
        .bind(prices.min_sale)
        .bind(prices.max_sale)
        .bind(prices.min_list)
        .bind(prices.max_list)
        .bind(aggregates.online)
        .execute(pool)
        .await?
    } else {
        sqlx::query(
            "UPDATE listings \
             SET status = CASE WHEN $2 THEN 1 ELSE status END, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(listing_id)
        .bind(aggregates.online)
        .execute(pool)
        .await?
    };

    Ok(result.rows_affected() == 1)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Returns the display name of a catalog category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_category_name(pool: &PgPool, category_id: i64) -> Result<Option<String>, DbError> {
    let name = sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;

    Ok(name)
}

/// Adds one to a store category counter in a single statement. Returns
/// `false` when the store category does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn increment_store_counter(
    pool: &PgPool,
    store_category_id: i64,
    counter: StoreCounter,
) -> Result<bool, DbError> {
    // Column names come from a closed enum, never from input.
    let column = counter.column();
    let result = sqlx::query(&format!(
        "UPDATE store_categories \
         SET {column} = {column} + 1, updated_at = NOW() \
         WHERE id = $1"
    ))
    .bind(store_category_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
