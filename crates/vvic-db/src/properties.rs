//! Database operations for `properties` and `property_values`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vvic_core::{NewPropertyValue, PropertyKind, VENDOR_IMPORTED_SOURCE};

use crate::DbError;

/// A row from the `property_values` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyValueRow {
    pub id: i64,
    pub property_id: i64,
    pub value: String,
    pub external_id: Option<String>,
    pub source: i16,
    pub reference_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creates the fixed property row for `kind` if it is missing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn ensure_property(pool: &PgPool, kind: PropertyKind) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO properties (id, name) VALUES ($1, $2) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(kind.property_id())
    .bind(kind.name())
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the id of the value stored under `property_id`, if any.
///
/// `value` must already be normalized; the lookup is an exact match.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_property_value_id(
    pool: &PgPool,
    property_id: i64,
    value: &str,
) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM property_values WHERE property_id = $1 AND value = $2",
    )
    .bind(property_id)
    .bind(value)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// Inserts a vendor-imported property value.
///
/// Returns `false` when another writer already created the same
/// `(property_id, value)` pair.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_property_value(
    pool: &PgPool,
    value: &NewPropertyValue,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO property_values (id, property_id, value, external_id, source) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (property_id, value) DO NOTHING",
    )
    .bind(value.id)
    .bind(value.property_id)
    .bind(&value.value)
    .bind(value.external_id.as_deref())
    .bind(VENDOR_IMPORTED_SOURCE)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adds one to `reference_count` of every listed value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn increment_property_value_references(
    pool: &PgPool,
    ids: &[i64],
) -> Result<u64, DbError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "UPDATE property_values \
         SET reference_count = reference_count + 1, updated_at = NOW() \
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
