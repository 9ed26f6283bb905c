//! Listing-level aggregation and the field sets sent to the search indexer.

use serde_json::{json, Map, Value};
use vvic_core::{ListingAggregates, ListingContent, NewListing, PriceRange};

use crate::skus::SkuSummary;

/// Min/max of the prices written during a pass, or `None` when no price was
/// written.
#[must_use]
pub fn price_range(sale_prices: &[i64], list_prices: &[i64]) -> Option<PriceRange> {
    Some(PriceRange {
        min_sale: *sale_prices.iter().min()?,
        max_sale: *sale_prices.iter().max()?,
        min_list: *list_prices.iter().min()?,
        max_list: *list_prices.iter().max()?,
    })
}

/// Aggregates for one listing: the region's price range, and whether it goes
/// online (some sellable SKU and the vendor lists the item as active).
#[must_use]
pub fn aggregate(summary: &SkuSummary, region: i32, vendor_active: bool) -> ListingAggregates {
    ListingAggregates {
        region,
        prices: price_range(&summary.sale_prices, &summary.list_prices),
        online: summary.status_sum > 0 && vendor_active,
    }
}

/// Fields of a content refresh, as the indexer names them.
#[must_use]
pub fn content_update_data(content: &ListingContent) -> Value {
    json!({
        "status": content.status.code(),
        "storeId": content.store_id,
        "images": content.images,
        "specs": content.specs,
        "unit": content.unit,
        "desc": content.desc,
        "title": content.title,
        "regions": content.regions,
        "categoryId": content.category_id,
        "categoryName": content.category_name,
    })
}

/// The indexable subset of a newly created listing.
#[must_use]
pub fn insert_data(listing: &NewListing) -> Value {
    let content = &listing.content;
    json!({
        "status": content.status.code(),
        "locations": listing.locations,
        "categoryName": content.category_name,
        "title": content.title,
        "spuId": listing.spu_id,
        "storeId": content.store_id,
        "specs": content.specs,
        "regions": content.regions,
        "thingId": listing.thing_id,
        "categoryId": content.category_id,
        "desc": content.desc,
        "storeCategoryId": listing.store_category_id,
    })
}

/// Fields touched by the aggregate step: region-keyed price bounds, plus the
/// status when the listing went online. `None` when nothing changed.
#[must_use]
pub fn aggregate_data(aggregates: &ListingAggregates) -> Option<Value> {
    let mut data = Map::new();
    if let Some(range) = aggregates.prices {
        let region = aggregates.region.to_string();
        for (field, value) in [
            ("minPrice", range.min_sale),
            ("maxPrice", range.max_sale),
            ("minListPrice", range.min_list),
            ("maxListPrice", range.max_list),
        ] {
            data.insert(field.to_string(), json!({ region.as_str(): value }));
        }
    }
    if aggregates.online {
        data.insert("status".to_string(), json!(1));
    }
    (!data.is_empty()).then_some(Value::Object(data))
}
