//! SKU upsert, pricing and inventory provisioning for one listing.

use vvic_core::{
    CatalogStore, IdGenerator, IdKind, NewSku, SkuContent, SkuInventory, SkuPrice, VendorSku,
    STORE_CATEGORY_ID, STORE_ID, VENDOR_ID,
};

use crate::error::SyncError;
use crate::images::{cook_image, distinct_images};
use crate::pricing::{PricingRules, WeightClass};
use crate::props::{normalize_label, ResolvedSpecs};

/// Sellability of a vendor SKU: offline when VVIC marks it inactive or out of
/// stock, otherwise the vendor status.
#[must_use]
pub fn sku_status(vendor_status: i16, is_lack: i16) -> i16 {
    if vendor_status == 0 || matches!(is_lack, 1 | 2) {
        0
    } else {
        vendor_status
    }
}

/// Images of one SKU: its own color image, then the listing gallery when
/// given, deduplicated.
#[must_use]
pub fn sku_images(color_img: Option<&str>, gallery: &[String]) -> Vec<String> {
    let own = color_img.map(cook_image);
    distinct_images(own.iter().chain(gallery))
}

/// Everything the SKU pass hands back to the listing aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuSummary {
    pub sale_prices: Vec<i64>,
    pub list_prices: Vec<i64>,
    /// Sum of the statuses of every acknowledged SKU write.
    pub status_sum: i64,
    pub created: usize,
    pub updated: usize,
}

/// Per-listing inputs shared by all SKUs of one pass.
#[derive(Debug, Clone, Copy)]
pub struct SkuPass<'a> {
    pub listing_id: i64,
    pub title: &'a str,
    pub region: i32,
    pub weight: &'a WeightClass,
    pub rules: &'a PricingRules,
    /// Listing gallery, attached to the first SKU only.
    pub gallery: &'a [String],
}

/// Upserts every vendor SKU of a listing together with its price and, for
/// new SKUs, its inventory.
///
/// # Errors
///
/// Returns an error if a store, the ID service or the price engine fails.
/// Writes the store does not acknowledge are logged and skipped.
pub async fn upsert_skus(
    catalog: &dyn CatalogStore,
    ids: &dyn IdGenerator,
    specs: &ResolvedSpecs,
    pass: SkuPass<'_>,
    skus: &[VendorSku],
) -> Result<SkuSummary, SyncError> {
    let mut summary = SkuSummary::default();

    for (index, sku) in skus.iter().enumerate() {
        let color = normalize_label(&sku.color);
        let size = normalize_label(&sku.size);
        let Some(key) = specs.sku_key(&color, &size) else {
            return Err(SyncError::UnresolvedPropertyValue {
                value: format!("{color},{size}"),
            });
        };

        let gallery: &[String] = if index == 0 { pass.gallery } else { &[] };
        let content = SkuContent {
            title: pass.title.to_string(),
            images: sku_images(sku.color_img.as_deref(), gallery),
            spec: format!("{color},{size}"),
            key,
            status: sku_status(sku.status, sku.is_lack),
        };

        let Some(sku_id) = write_sku(catalog, ids, &pass, sku, &content, &mut summary).await?
        else {
            continue;
        };
        summary.status_sum += i64::from(content.status);

        let quote = pass.rules.quote(sku.price, pass.weight)?;
        let price = SkuPrice {
            sku_id,
            listing_id: pass.listing_id,
            region: pass.region,
            sale_price: quote.sale_price,
            list_price: quote.list_price,
        };
        if catalog.upsert_sku_price(&price).await? {
            summary.sale_prices.push(quote.sale_price);
            summary.list_prices.push(quote.list_price);
        } else {
            tracing::warn!(sku_id, region = pass.region, "sku price write not acknowledged");
        }
    }

    Ok(summary)
}

/// Updates or creates the SKU spec. Returns the SKU id when the write was
/// acknowledged.
async fn write_sku(
    catalog: &dyn CatalogStore,
    ids: &dyn IdGenerator,
    pass: &SkuPass<'_>,
    sku: &VendorSku,
    content: &SkuContent,
    summary: &mut SkuSummary,
) -> Result<Option<i64>, SyncError> {
    if let Some(sku_id) = catalog
        .find_sku_by_vendor_id(pass.listing_id, &sku.sku_id)
        .await?
    {
        if !catalog.update_sku(sku_id, &sku.sku_id, content).await? {
            tracing::warn!(sku_id, vendor_sku = %sku.sku_id, "sku update not acknowledged");
            return Ok(None);
        }
        summary.updated += 1;
        return Ok(Some(sku_id));
    }

    let new_sku = NewSku {
        id: ids.next_id(IdKind::Sku).await?,
        listing_id: pass.listing_id,
        id_by_vendor: sku.sku_id.clone(),
        content: content.clone(),
        store_id: STORE_ID,
        vendor_id: VENDOR_ID,
        store_category_id: STORE_CATEGORY_ID,
    };
    if !catalog.insert_sku(&new_sku).await? {
        tracing::warn!(
            listing_id = pass.listing_id,
            vendor_sku = %sku.sku_id,
            "sku insert not acknowledged"
        );
        return Ok(None);
    }
    summary.created += 1;

    let inventory = SkuInventory::unlimited(new_sku.id, pass.listing_id);
    if !catalog.insert_sku_inventory(&inventory).await? {
        tracing::warn!(sku_id = new_sku.id, "sku inventory write not acknowledged");
    }
    Ok(Some(new_sku.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_status_table() {
        assert_eq!(sku_status(1, 0), 1);
        assert_eq!(sku_status(0, 0), 0);
        assert_eq!(sku_status(1, 1), 0);
        assert_eq!(sku_status(1, 2), 0);
        assert_eq!(sku_status(1, 3), 1);
        assert_eq!(sku_status(2, 0), 2);
    }

    #[test]
    fn sku_images_put_own_image_first() {
        let gallery = vec![
            "https://img/g1.jpg".to_string(),
            "https://img/c.jpg".to_string(),
        ];
        assert_eq!(
            sku_images(Some("//img/c.jpg"), &gallery),
            vec!["https://img/c.jpg", "https://img/g1.jpg"]
        );
    }

    #[test]
    fn sku_images_without_gallery_or_own_image() {
        assert!(sku_images(None, &[]).is_empty());
        assert!(sku_images(Some("  "), &[]).is_empty());
    }
}
