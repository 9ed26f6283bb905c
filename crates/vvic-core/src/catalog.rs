//! Catalog entities written by the importer.
//!
//! These are the write-side shapes of the internal catalog: listings, SKU
//! specs, prices, inventory and the shared property dictionary. Store
//! backends persist them however they like; the reconciliation core only
//! deals in these types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor id assigned to VVIC in the catalog.
pub const VENDOR_ID: i64 = 4;
/// Store that owns every imported listing.
pub const STORE_ID: i64 = 6;
/// Warehouse that fulfils every imported SKU.
pub const WAREHOUSE_ID: i64 = 6;
/// Seller store category whose counters track imported listings.
pub const STORE_CATEGORY_ID: i64 = 6;
/// Stock written for new SKUs; VVIC stock is treated as unlimited.
pub const UNLIMITED_STOCK: i64 = 99_999_999;
/// `PropertyValue.source` marker for values created by this importer.
pub const VENDOR_IMPORTED_SOURCE: i16 = 3;
/// Unit label shown on imported listings.
pub const LISTING_UNIT: &str = "piece";
/// Ship-from location of every VVIC listing.
pub const LISTING_LOCATION: &str = "China";

/// The two attribute types VVIC SKUs vary on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Color,
    Size,
}

impl PropertyKind {
    /// Fixed property id in the shared property dictionary.
    #[must_use]
    pub const fn property_id(self) -> i64 {
        match self {
            PropertyKind::Color => 71_000_000_001,
            PropertyKind::Size => 71_000_000_002,
        }
    }

    /// English display name of the property.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PropertyKind::Color => "Color",
            PropertyKind::Size => "Size",
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value that does not exist yet in the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPropertyValue {
    pub id: i64,
    pub property_id: i64,
    /// Normalized (trimmed, lowercased) value text.
    pub value: String,
    /// The vendor's own id for this value, kept for traceability.
    pub external_id: Option<String>,
}

/// One selectable value inside a [`SpecGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecValue {
    /// Property value id.
    pub id: i64,
    pub value: String,
}

/// A property and the values a listing offers for it, e.g. Color with
/// `["red", "black"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecGroup {
    /// Property id.
    pub id: i64,
    pub name: String,
    pub values: Vec<SpecValue>,
}

/// Shipping package of a listing. Only the weight is known for VVIC items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Effective shipping weight in kilograms.
    pub weight: Decimal,
    pub width: Option<Decimal>,
    pub length: Option<Decimal>,
    pub height: Option<Decimal>,
    pub lot: bool,
}

impl Package {
    #[must_use]
    pub fn with_weight(weight: Decimal) -> Self {
        Self {
            weight,
            width: None,
            length: None,
            height: None,
            lot: false,
        }
    }
}

/// Listing visibility. Stored as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStatus {
    #[default]
    Offline,
    Online,
}

impl ListingStatus {
    /// Interpret a stored status code. Anything above zero counts as online.
    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        if code > 0 {
            ListingStatus::Online
        } else {
            ListingStatus::Offline
        }
    }

    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            ListingStatus::Offline => 0,
            ListingStatus::Online => 1,
        }
    }

    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, ListingStatus::Online)
    }
}

/// Identity and current status of an existing listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRef {
    pub id: i64,
    pub status: ListingStatus,
}

/// The vendor-derived content of a listing, rewritten on every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingContent {
    pub title: String,
    pub desc: String,
    pub images: Vec<String>,
    pub specs: Vec<SpecGroup>,
    pub unit: String,
    pub package: Package,
    pub regions: Vec<i32>,
    pub category_id: i64,
    pub category_name: String,
    pub store_id: i64,
    /// Written as offline; the aggregate step decides whether it goes online.
    pub status: ListingStatus,
}

/// A listing about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub id: i64,
    pub id_by_vendor: String,
    pub content: ListingContent,
    pub vendor_id: i64,
    pub store_category_id: i64,
    pub spu_id: i64,
    pub thing_id: i64,
    pub locations: Vec<String>,
}

/// Sale and list price bounds for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min_sale: i64,
    pub max_sale: i64,
    pub min_list: i64,
    pub max_list: i64,
}

/// Values written onto a listing after all of its SKUs were processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingAggregates {
    pub region: i32,
    /// `None` when no SKU price was written during this pass.
    pub prices: Option<PriceRange>,
    /// `true` sets the listing online; `false` leaves the status untouched.
    pub online: bool,
}

/// The vendor-derived content of a SKU spec, rewritten on every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuContent {
    pub title: String,
    pub images: Vec<String>,
    /// `"color,size"`.
    pub spec: String,
    /// `"colorPropId:colorValueId;sizePropId:sizeValueId"`.
    pub key: String,
    pub status: i16,
}

/// A SKU spec about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSku {
    pub id: i64,
    pub listing_id: i64,
    pub id_by_vendor: String,
    pub content: SkuContent,
    pub store_id: i64,
    pub vendor_id: i64,
    pub store_category_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuPrice {
    pub sku_id: i64,
    pub listing_id: i64,
    pub region: i32,
    pub sale_price: i64,
    pub list_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuInventory {
    pub sku_id: i64,
    pub listing_id: i64,
    pub warehouse_id: i64,
    pub vendor_id: i64,
    pub stock: i64,
    pub reservation: i64,
}

impl SkuInventory {
    /// Inventory row provisioned for a freshly created VVIC SKU.
    #[must_use]
    pub const fn unlimited(sku_id: i64, listing_id: i64) -> Self {
        Self {
            sku_id,
            listing_id,
            warehouse_id: WAREHOUSE_ID,
            vendor_id: VENDOR_ID,
            stock: UNLIMITED_STOCK,
            reservation: 0,
        }
    }
}

/// Counters kept on a seller store category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCounter {
    Listing,
    Online,
}

impl StoreCounter {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            StoreCounter::Listing => "listing_count",
            StoreCounter::Online => "online_count",
        }
    }
}
