//! In-memory stand-ins for the catalog, staging store, queue and ID service.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use vvic_core::{
    CatalogStore, Delivery, IdError, IdGenerator, IdKind, ListingAggregates, ListingContent,
    ListingRef, ListingStatus, MessageQueue, NewListing, NewPropertyValue, NewSku, PropertyKind,
    QueueConnector, QueueError, SkuContent, SkuInventory, SkuPrice, StagingStore, StoreCounter,
    StoreError,
};

// ---------------------------------------------------------------------------
// Staging

#[derive(Default)]
pub struct MemoryStaging {
    products: Mutex<Vec<(String, Value)>>,
}

impl MemoryStaging {
    pub fn with(products: &[Value]) -> Self {
        let staging = Self::default();
        {
            let mut guard = staging.products.lock().unwrap();
            for product in products {
                let vid = product["item_vid"].as_str().unwrap().to_string();
                guard.push((vid, product.clone()));
            }
        }
        staging
    }

    pub fn get(&self, item_vid: &str) -> Option<Value> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|(vid, _)| vid == item_vid)
            .map(|(_, raw)| raw.clone())
    }

    pub fn len(&self) -> usize {
        self.products.lock().unwrap().len()
    }
}

#[async_trait]
impl StagingStore for MemoryStaging {
    async fn upsert_vendor_product(&self, item_vid: &str, raw: &Value) -> Result<(), StoreError> {
        let mut guard = self.products.lock().unwrap();
        match guard.iter_mut().find(|(vid, _)| vid == item_vid) {
            Some(entry) => entry.1 = raw.clone(),
            None => guard.push((item_vid.to_string(), raw.clone())),
        }
        Ok(())
    }

    async fn vendor_product(&self, item_vid: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get(item_vid))
    }

    async fn vendor_item_vids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .map(|(vid, _)| vid.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Catalog

#[derive(Debug, Clone)]
pub struct StoredValue {
    pub id: i64,
    pub property_id: i64,
    pub value: String,
    pub external_id: Option<String>,
    pub references: i64,
}

#[derive(Debug, Clone)]
pub struct StoredListing {
    pub id: i64,
    pub id_by_vendor: String,
    pub content: ListingContent,
    pub status: ListingStatus,
    pub min_price: HashMap<i32, i64>,
    pub max_price: HashMap<i32, i64>,
    pub min_list_price: HashMap<i32, i64>,
    pub max_list_price: HashMap<i32, i64>,
    pub spu_id: i64,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StoredSku {
    pub id: i64,
    pub listing_id: i64,
    pub id_by_vendor: String,
    pub content: SkuContent,
}

#[derive(Default)]
pub struct CatalogState {
    pub properties: Vec<PropertyKind>,
    pub values: Vec<StoredValue>,
    pub categories: HashMap<i64, String>,
    pub listings: Vec<StoredListing>,
    pub skus: Vec<StoredSku>,
    pub prices: HashMap<(i64, i32), (i64, i64)>,
    pub inventory: HashMap<i64, SkuInventory>,
    pub listing_count: i64,
    pub online_count: i64,
    /// Listing writes answer "not acknowledged" while set.
    pub refuse_listing_writes: bool,
    /// Vendor SKU ids whose update, insert, price or inventory write is
    /// not acknowledged.
    pub refuse_sku_updates: HashSet<String>,
    pub refuse_sku_inserts: HashSet<String>,
    pub refuse_prices: HashSet<String>,
    pub refuse_inventory: HashSet<String>,
    /// Store counter updates answer "not acknowledged" while set.
    pub refuse_counters: bool,
}

impl CatalogState {
    fn vendor_sku_id(&self, sku_id: i64) -> Option<&str> {
        self.skus
            .iter()
            .find(|s| s.id == sku_id)
            .map(|s| s.id_by_vendor.as_str())
    }
}

#[derive(Default)]
pub struct MemoryCatalog {
    pub state: Mutex<CatalogState>,
}

impl MemoryCatalog {
    pub fn with_category(id: i64, name: &str) -> Self {
        let catalog = Self::default();
        catalog
            .state
            .lock()
            .unwrap()
            .categories
            .insert(id, name.to_string());
        catalog
    }

    pub fn listing(&self, id_by_vendor: &str) -> Option<StoredListing> {
        self.state
            .lock()
            .unwrap()
            .listings
            .iter()
            .find(|l| l.id_by_vendor == id_by_vendor)
            .cloned()
    }

    pub fn skus_of(&self, listing_id: i64) -> Vec<StoredSku> {
        self.state
            .lock()
            .unwrap()
            .skus
            .iter()
            .filter(|s| s.listing_id == listing_id)
            .cloned()
            .collect()
    }

    pub fn values(&self) -> Vec<StoredValue> {
        self.state.lock().unwrap().values.clone()
    }

    pub fn counters(&self) -> (i64, i64) {
        let state = self.state.lock().unwrap();
        (state.listing_count, state.online_count)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn ensure_property(&self, kind: PropertyKind) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.properties.contains(&kind) {
            state.properties.push(kind);
        }
        Ok(())
    }

    async fn find_property_value(
        &self,
        property_id: i64,
        value: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .values
            .iter()
            .find(|v| v.property_id == property_id && v.value == value)
            .map(|v| v.id))
    }

    async fn insert_property_value(&self, value: &NewPropertyValue) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state
            .values
            .iter()
            .any(|v| v.property_id == value.property_id && v.value == value.value)
        {
            return Ok(false);
        }
        state.values.push(StoredValue {
            id: value.id,
            property_id: value.property_id,
            value: value.value.clone(),
            external_id: value.external_id.clone(),
            references: 0,
        });
        Ok(true)
    }

    async fn increment_property_value_references(&self, ids: &[i64]) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let mut changed = 0;
        for value in state.values.iter_mut().filter(|v| ids.contains(&v.id)) {
            value.references += 1;
            changed += 1;
        }
        Ok(changed)
    }

    async fn category_name(&self, category_id: i64) -> Result<Option<String>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .get(&category_id)
            .cloned())
    }

    async fn find_listing_by_vendor_id(
        &self,
        id_by_vendor: &str,
    ) -> Result<Option<ListingRef>, StoreError> {
        Ok(self.listing(id_by_vendor).map(|l| ListingRef {
            id: l.id,
            status: l.status,
        }))
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_listing_writes
            || state
                .listings
                .iter()
                .any(|l| l.id_by_vendor == listing.id_by_vendor)
        {
            return Ok(false);
        }
        state.listings.push(StoredListing {
            id: listing.id,
            id_by_vendor: listing.id_by_vendor.clone(),
            content: listing.content.clone(),
            status: listing.content.status,
            min_price: HashMap::new(),
            max_price: HashMap::new(),
            min_list_price: HashMap::new(),
            max_list_price: HashMap::new(),
            spu_id: listing.spu_id,
            locations: listing.locations.clone(),
        });
        Ok(true)
    }

    async fn update_listing_content(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
        content: &ListingContent,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_listing_writes {
            return Ok(false);
        }
        let Some(listing) = state
            .listings
            .iter_mut()
            .find(|l| l.id == listing_id && l.id_by_vendor == id_by_vendor)
        else {
            return Ok(false);
        };
        listing.content = content.clone();
        listing.status = content.status;
        Ok(true)
    }

    async fn update_listing_aggregates(
        &self,
        listing_id: i64,
        aggregates: &ListingAggregates,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(listing) = state.listings.iter_mut().find(|l| l.id == listing_id) else {
            return Ok(false);
        };
        if let Some(range) = aggregates.prices {
            listing.min_price.insert(aggregates.region, range.min_sale);
            listing.max_price.insert(aggregates.region, range.max_sale);
            listing
                .min_list_price
                .insert(aggregates.region, range.min_list);
            listing
                .max_list_price
                .insert(aggregates.region, range.max_list);
        }
        if aggregates.online {
            listing.status = ListingStatus::Online;
        }
        Ok(true)
    }

    async fn offline_skus(&self, listing_id: i64) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let mut changed = 0;
        for sku in state.skus.iter_mut().filter(|s| s.listing_id == listing_id) {
            sku.content.status = 0;
            changed += 1;
        }
        Ok(changed)
    }

    async fn find_sku_by_vendor_id(
        &self,
        listing_id: i64,
        id_by_vendor: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .skus
            .iter()
            .find(|s| s.listing_id == listing_id && s.id_by_vendor == id_by_vendor)
            .map(|s| s.id))
    }

    async fn insert_sku(&self, sku: &NewSku) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_sku_inserts.contains(&sku.id_by_vendor)
            || state
                .skus
                .iter()
                .any(|s| s.listing_id == sku.listing_id && s.id_by_vendor == sku.id_by_vendor)
        {
            return Ok(false);
        }
        state.skus.push(StoredSku {
            id: sku.id,
            listing_id: sku.listing_id,
            id_by_vendor: sku.id_by_vendor.clone(),
            content: sku.content.clone(),
        });
        Ok(true)
    }

    async fn update_sku(
        &self,
        sku_id: i64,
        id_by_vendor: &str,
        content: &SkuContent,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_sku_updates.contains(id_by_vendor) {
            return Ok(false);
        }
        let Some(sku) = state
            .skus
            .iter_mut()
            .find(|s| s.id == sku_id && s.id_by_vendor == id_by_vendor)
        else {
            return Ok(false);
        };
        sku.content = content.clone();
        Ok(true)
    }

    async fn upsert_sku_price(&self, price: &SkuPrice) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state
            .vendor_sku_id(price.sku_id)
            .is_some_and(|vid| state.refuse_prices.contains(vid))
        {
            return Ok(false);
        }
        state.prices.insert(
            (price.sku_id, price.region),
            (price.sale_price, price.list_price),
        );
        Ok(true)
    }

    async fn insert_sku_inventory(&self, inventory: &SkuInventory) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let refused = state
            .vendor_sku_id(inventory.sku_id)
            .is_some_and(|vid| state.refuse_inventory.contains(vid));
        if refused || state.inventory.contains_key(&inventory.sku_id) {
            return Ok(false);
        }
        state.inventory.insert(inventory.sku_id, *inventory);
        Ok(true)
    }

    async fn increment_store_counter(
        &self,
        _store_category_id: i64,
        counter: StoreCounter,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_counters {
            return Ok(false);
        }
        match counter {
            StoreCounter::Listing => state.listing_count += 1,
            StoreCounter::Online => state.online_count += 1,
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// IDs

pub struct SequentialIds {
    next: AtomicI64,
    pub issued: Mutex<Vec<IdKind>>,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self {
            next: AtomicI64::new(1_000),
            issued: Mutex::new(Vec::new()),
        }
    }
}

impl SequentialIds {
    pub fn issued_count(&self, kind: IdKind) -> usize {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .filter(|k| **k == kind)
            .count()
    }
}

#[async_trait]
impl IdGenerator for SequentialIds {
    async fn next_id(&self, kind: IdKind) -> Result<i64, IdError> {
        self.issued.lock().unwrap().push(kind);
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------------------
// Queue

#[derive(Default)]
pub struct QueueState {
    next_id: i64,
    pub pending: HashMap<String, VecDeque<Delivery>>,
    pub published: Vec<(String, String)>,
    pub acked: Vec<i64>,
    /// Rejected deliveries wait here instead of going straight back to the
    /// queue, mirroring a delayed redelivery.
    pub rejected: Vec<(Delivery, String)>,
    pub declared: Vec<String>,
}

/// A queue whose state is shared between every clone.
#[derive(Clone, Default)]
pub struct MemoryQueue {
    pub state: Arc<Mutex<QueueState>>,
    /// Number of upcoming publishes that fail.
    pub failing_publishes: Arc<AtomicUsize>,
}

impl MemoryQueue {
    pub fn published_to(&self, queue: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .published
            .iter()
            .filter(|(name, _)| name == queue)
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }

    pub fn push_raw(&self, queue: &str, payload: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let delivery = Delivery {
            id: state.next_id,
            queue: queue.to_string(),
            payload: payload.to_string(),
            attempts: 0,
        };
        state
            .pending
            .entry(queue.to_string())
            .or_default()
            .push_back(delivery);
    }

    pub fn pending_len(&self, queue: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .pending
            .get(queue)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn declare_queue(&self, queue: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        if !state.declared.iter().any(|q| q == queue) {
            state.declared.push(queue.to_string());
        }
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: &str) -> Result<(), QueueError> {
        let failing = self.failing_publishes.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_publishes.store(failing - 1, Ordering::SeqCst);
            return Err(QueueError::Backend("broker went away".into()));
        }
        self.push_raw(queue, payload);
        self.state
            .lock()
            .unwrap()
            .published
            .push((queue.to_string(), payload.to_string()));
        Ok(())
    }

    async fn purge(&self, queue: &str) -> Result<u64, QueueError> {
        let mut state = self.state.lock().unwrap();
        let purged = state.pending.remove(queue).map_or(0, |q| q.len());
        Ok(purged as u64)
    }

    async fn claim(&self, queue: &str) -> Result<Option<Delivery>, QueueError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .pending
            .get_mut(queue)
            .and_then(VecDeque::pop_front)
            .map(|mut delivery| {
                delivery.attempts += 1;
                delivery
            }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.state.lock().unwrap().acked.push(delivery.id);
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery, reason: &str) -> Result<(), QueueError> {
        self.state
            .lock()
            .unwrap()
            .rejected
            .push((delivery.clone(), reason.to_string()));
        Ok(())
    }
}

/// Hands out handles to one shared [`MemoryQueue`].
#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub queue: MemoryQueue,
    pub connects: Arc<AtomicUsize>,
    /// Number of upcoming connects that fail.
    pub failing_connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueConnector for MemoryConnector {
    type Queue = MemoryQueue;

    async fn connect(&self) -> Result<MemoryQueue, QueueError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_connects.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_connects.store(failing - 1, Ordering::SeqCst);
            return Err(QueueError::Connect("connection refused".into()));
        }
        Ok(self.queue.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixtures

pub const CATEGORY_ID: i64 = 1203;
pub const REGION: i32 = 1;
pub const INDEX_QUEUE: &str = "search-index";

pub fn vendor_product(item_vid: &str, status: i64, skus: Value) -> Value {
    json!({
        "item_vid": item_vid,
        "item_title": "Ribbed knit cardigan",
        "price": "100",
        "weight_type": 1,
        "status": status,
        "item_view_image": "//img.vvic.com/g1.jpg,//img.vvic.com/g2.jpg",
        "list_grid_image": "//img.vvic.com/g2.jpg,",
        "color_imgs": "//img.vvic.com/red.jpg",
        "sku_list": skus,
    })
}

pub fn sku(sku_id: &str, color: &str, size: &str, status: i64, is_lack: i64) -> Value {
    json!({
        "sku_id": sku_id,
        "color": color,
        "color_id": format!("c-{}", color.trim().to_lowercase()),
        "size": size,
        "size_id": format!("s-{}", size.trim().to_lowercase()),
        "color_img": format!("//img.vvic.com/{}.jpg", color.trim().to_lowercase()),
        "price": "100",
        "status": status,
        "is_lack": is_lack,
    })
}
