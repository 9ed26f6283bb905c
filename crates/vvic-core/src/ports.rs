//! Seams between the importer and its external collaborators.
//!
//! Write methods return `Ok(false)` when the backend did not acknowledge the
//! write (nothing matched, or a conflicting row already exists). Callers
//! log that and move on; `Err` is reserved for backend failures.

use async_trait::async_trait;

use crate::catalog::{
    ListingAggregates, ListingContent, ListingRef, NewListing, NewPropertyValue, NewSku,
    PropertyKind, SkuContent, SkuInventory, SkuPrice, StoreCounter,
};
use crate::error::{IdError, QueueError, StoreError};

/// Raw vendor records, staged by `item_vid`.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Insert or overwrite the staged document for `item_vid`.
    async fn upsert_vendor_product(
        &self,
        item_vid: &str,
        raw: &serde_json::Value,
    ) -> Result<(), StoreError>;

    async fn vendor_product(&self, item_vid: &str)
        -> Result<Option<serde_json::Value>, StoreError>;

    /// Every staged `item_vid`, oldest first.
    async fn vendor_item_vids(&self) -> Result<Vec<String>, StoreError>;
}

/// The internal catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Create the fixed property if it does not exist yet.
    async fn ensure_property(&self, kind: PropertyKind) -> Result<(), StoreError>;

    async fn find_property_value(
        &self,
        property_id: i64,
        value: &str,
    ) -> Result<Option<i64>, StoreError>;

    async fn insert_property_value(&self, value: &NewPropertyValue) -> Result<bool, StoreError>;

    /// Add one to the reference count of each id. Returns how many rows changed.
    async fn increment_property_value_references(&self, ids: &[i64]) -> Result<u64, StoreError>;

    async fn category_name(&self, category_id: i64) -> Result<Option<String>, StoreError>;

    async fn find_listing_by_vendor_id(
        &self,
        id_by_vendor: &str,
    ) -> Result<Option<ListingRef>, StoreError>;

    async fn insert_listing(&self, listing: &NewListing) -> Result<bool, StoreError>;

    async fn update_listing_content(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
        content: &ListingContent,
    ) -> Result<bool, StoreError>;

    async fn update_listing_aggregates(
        &self,
        listing_id: i64,
        aggregates: &ListingAggregates,
    ) -> Result<bool, StoreError>;

    /// Set every SKU of the listing offline. Returns how many rows changed.
    async fn offline_skus(&self, listing_id: i64) -> Result<u64, StoreError>;

    async fn find_sku_by_vendor_id(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
    ) -> Result<Option<i64>, StoreError>;

    async fn insert_sku(&self, sku: &NewSku) -> Result<bool, StoreError>;

    async fn update_sku(
        &self,
        sku_id: i64,
        id_by_vendor: &str,
        content: &SkuContent,
    ) -> Result<bool, StoreError>;

    /// Insert the `(sku_id, region)` price or overwrite both prices.
    async fn upsert_sku_price(&self, price: &SkuPrice) -> Result<bool, StoreError>;

    async fn insert_sku_inventory(&self, inventory: &SkuInventory) -> Result<bool, StoreError>;

    /// Atomically add one to a store category counter. `Ok(false)` when no
    /// store category row was updated.
    async fn increment_store_counter(
        &self,
        store_category_id: i64,
        counter: StoreCounter,
    ) -> Result<bool, StoreError>;
}

/// Entity families the ID service hands out identifiers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    PropertyValue,
    Listing,
    Sku,
}

impl IdKind {
    /// Name the ID service knows the sequence by.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IdKind::PropertyValue => "PropValue",
            IdKind::Listing => "SpecOfListing",
            IdKind::Sku => "SpecOfSku",
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External unique-ID service.
#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn next_id(&self, kind: IdKind) -> Result<i64, IdError>;
}

/// A message claimed from a queue, pending acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: i64,
    pub queue: String,
    pub payload: String,
    /// Delivery attempts so far, including this one.
    pub attempts: i32,
}

/// A durable, named-queue message broker client.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Make sure the named queue exists.
    async fn declare_queue(&self, queue: &str) -> Result<(), QueueError>;

    async fn publish(&self, queue: &str, payload: &str) -> Result<(), QueueError>;

    /// Drop every pending message. Returns how many were removed.
    async fn purge(&self, queue: &str) -> Result<u64, QueueError>;

    /// Claim the next pending message, if any. At most one message is held
    /// per claim.
    async fn claim(&self, queue: &str) -> Result<Option<Delivery>, QueueError>;

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Hand the message back for redelivery.
    async fn reject(&self, delivery: &Delivery, reason: &str) -> Result<(), QueueError>;
}

/// Opens fresh [`MessageQueue`] connections.
#[async_trait]
pub trait QueueConnector: Send + Sync {
    type Queue: MessageQueue;

    async fn connect(&self) -> Result<Self::Queue, QueueError>;
}
