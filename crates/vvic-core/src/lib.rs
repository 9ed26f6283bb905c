pub mod app_config;
pub mod catalog;
pub mod config;
pub mod error;
pub mod jobs;
pub mod ports;
pub mod vendor;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    ListingAggregates, ListingContent, ListingRef, ListingStatus, NewListing, NewPropertyValue,
    NewSku, Package, PriceRange, PropertyKind, SkuContent, SkuInventory, SkuPrice, SpecGroup,
    SpecValue, StoreCounter, LISTING_LOCATION, LISTING_UNIT, STORE_CATEGORY_ID, STORE_ID,
    UNLIMITED_STOCK, VENDOR_ID, VENDOR_IMPORTED_SOURCE, WAREHOUSE_ID,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, IdError, QueueError, StoreError};
pub use jobs::{DetailJob, ImportJob, IndexMessage, IndexOperation, DETAIL_QUEUE, IMPORT_QUEUE};
pub use ports::{
    CatalogStore, Delivery, IdGenerator, IdKind, MessageQueue, QueueConnector, StagingStore,
};
pub use vendor::{VendorProduct, VendorSku};
