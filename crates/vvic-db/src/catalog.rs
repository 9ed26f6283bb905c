//! [`StagingStore`] and [`CatalogStore`] backed by the Postgres pool.

use async_trait::async_trait;
use sqlx::PgPool;
use vvic_core::{
    CatalogStore, ListingAggregates, ListingContent, ListingRef, ListingStatus, NewListing,
    NewPropertyValue, NewSku, PropertyKind, SkuContent, SkuInventory, SkuPrice, StagingStore,
    StoreCounter, StoreError,
};

use crate::{listings, properties, skus, staging};

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StagingStore for PgCatalog {
    async fn upsert_vendor_product(
        &self,
        item_vid: &str,
        raw: &serde_json::Value,
    ) -> Result<(), StoreError> {
        Ok(staging::upsert_vendor_product(&self.pool, item_vid, raw).await?)
    }

    async fn vendor_product(
        &self,
        item_vid: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let row = staging::get_vendor_product(&self.pool, item_vid).await?;
        Ok(row.map(|row| row.raw))
    }

    async fn vendor_item_vids(&self) -> Result<Vec<String>, StoreError> {
        Ok(staging::list_vendor_item_vids(&self.pool).await?)
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn ensure_property(&self, kind: PropertyKind) -> Result<(), StoreError> {
        Ok(properties::ensure_property(&self.pool, kind).await?)
    }

    async fn find_property_value(
        &self,
        property_id: i64,
        value: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(properties::find_property_value_id(&self.pool, property_id, value).await?)
    }

    async fn insert_property_value(&self, value: &NewPropertyValue) -> Result<bool, StoreError> {
        Ok(properties::insert_property_value(&self.pool, value).await?)
    }

    async fn increment_property_value_references(&self, ids: &[i64]) -> Result<u64, StoreError> {
        Ok(properties::increment_property_value_references(&self.pool, ids).await?)
    }

    async fn category_name(&self, category_id: i64) -> Result<Option<String>, StoreError> {
        Ok(listings::get_category_name(&self.pool, category_id).await?)
    }

    async fn find_listing_by_vendor_id(
        &self,
        id_by_vendor: &str,
    ) -> Result<Option<ListingRef>, StoreError> {
        let row = listings::find_listing_by_vendor_id(&self.pool, id_by_vendor).await?;
        Ok(row.map(|row| ListingRef {
            id: row.id,
            status: ListingStatus::from_code(row.status),
        }))
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<bool, StoreError> {
        Ok(listings::insert_listing(&self.pool, listing).await?)
    }

    async fn update_listing_content(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
        content: &ListingContent,
    ) -> Result<bool, StoreError> {
        Ok(listings::update_listing_content(&self.pool, listing_id, id_by_vendor, content).await?)
    }

    async fn update_listing_aggregates(
        &self,
        listing_id: i64,
        aggregates: &ListingAggregates,
    ) -> Result<bool, StoreError> {
        Ok(listings::update_listing_aggregates(&self.pool, listing_id, aggregates).await?)
    }

    async fn offline_skus(&self, listing_id: i64) -> Result<u64, StoreError> {
        Ok(skus::offline_skus(&self.pool, listing_id).await?)
    }

    async fn find_sku_by_vendor_id(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(skus::find_sku_id(&self.pool, listing_id, id_by_vendor).await?)
    }

    async fn insert_sku(&self, sku: &NewSku) -> Result<bool, StoreError> {
        Ok(skus::insert_sku(&self.pool, sku).await?)
    }

    async fn update_sku(
        &self,
        sku_id: i64,
        id_by_vendor: &str,
        content: &SkuContent,
    ) -> Result<bool, StoreError> {
        Ok(skus::update_sku(&self.pool, sku_id, id_by_vendor, content).await?)
    }

    async fn upsert_sku_price(&self, price: &SkuPrice) -> Result<bool, StoreError> {
        Ok(skus::upsert_sku_price(&self.pool, price).await?)
    }

    async fn insert_sku_inventory(&self, inventory: &SkuInventory) -> Result<bool, StoreError> {
        Ok(skus::insert_sku_inventory(&self.pool, inventory).await?)
    }

    async fn increment_store_counter(
        &self,
        store_category_id: i64,
        counter: StoreCounter,
    ) -> Result<bool, StoreError> {
        Ok(listings::increment_store_counter(&self.pool, store_category_id, counter).await?)
    }
}
