//! Reconciliation of one staged VVIC item into the catalog.
//!
//! A pass is a sequence of individual natural-key upserts with no enclosing
//! transaction. Re-running a pass converges on the same rows and ids.

use std::sync::Arc;

use vvic_core::{
    CatalogStore, IdGenerator, IdKind, IndexMessage, ListingContent, ListingRef, ListingStatus,
    NewListing, Package, QueueConnector, StagingStore, StoreCounter, VendorProduct,
    LISTING_LOCATION, LISTING_UNIT, STORE_CATEGORY_ID, STORE_ID, VENDOR_ID,
};

use crate::error::SyncError;
use crate::images::{distinct_images, split_images};
use crate::listing::{aggregate, aggregate_data, content_update_data, insert_data};
use crate::notify::ChangeNotifier;
use crate::pricing::{PricingRules, WeightClass};
use crate::props::{ensure_properties, resolve_specs, ResolvedSpecs};
use crate::skus::{upsert_skus, SkuPass, SkuSummary};

/// What happened to the listing during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    Created,
    Updated,
    /// The listing write was not acknowledged; SKUs were left alone.
    NotAcknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub item_vid: String,
    pub listing_id: i64,
    pub outcome: ListingOutcome,
    pub skus_created: usize,
    pub skus_updated: usize,
    pub online: bool,
}

impl ImportReport {
    fn not_acknowledged(item_vid: &str, listing_id: i64) -> Self {
        Self {
            item_vid: item_vid.to_string(),
            listing_id,
            outcome: ListingOutcome::NotAcknowledged,
            skus_created: 0,
            skus_updated: 0,
            online: false,
        }
    }
}

/// Vendor-derived pieces of a listing computed before any write.
struct Draft {
    product: VendorProduct,
    weight: WeightClass,
    specs: ResolvedSpecs,
    gallery: Vec<String>,
    content: ListingContent,
}

pub struct Reconciler<C: QueueConnector> {
    staging: Arc<dyn StagingStore>,
    catalog: Arc<dyn CatalogStore>,
    ids: Arc<dyn IdGenerator>,
    notifier: ChangeNotifier<C>,
    rules: PricingRules,
}

impl<C: QueueConnector> Reconciler<C> {
    pub fn new(
        staging: Arc<dyn StagingStore>,
        catalog: Arc<dyn CatalogStore>,
        ids: Arc<dyn IdGenerator>,
        notifier: ChangeNotifier<C>,
    ) -> Self {
        Self {
            staging,
            catalog,
            ids,
            notifier,
            rules: PricingRules::default(),
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: PricingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Ensures the fixed Color and Size properties exist.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the catalog rejects the write.
    pub async fn bootstrap(&self) -> Result<(), SyncError> {
        ensure_properties(self.catalog.as_ref()).await
    }

    /// Creates or refreshes the listing for a staged VVIC item, with its SKUs,
    /// prices and inventory.
    ///
    /// # Errors
    ///
    /// Fails when the item is not staged or malformed, its weight class or
    /// category is unknown, or a store, the ID service or the price engine
    /// fails. Unacknowledged writes are logged and do not fail the pass.
    pub async fn import_listing(
        &mut self,
        item_vid: &str,
        category_id: i64,
        region: i32,
    ) -> Result<ImportReport, SyncError> {
        let draft = self.draft(item_vid, category_id, region).await?;

        let report = match self.catalog.find_listing_by_vendor_id(item_vid).await? {
            Some(existing) => self.refresh_listing(item_vid, existing, &draft, region).await?,
            None => self.create_listing(item_vid, &draft, region).await?,
        };

        tracing::info!(
            item_vid,
            listing_id = report.listing_id,
            outcome = ?report.outcome,
            skus_created = report.skus_created,
            skus_updated = report.skus_updated,
            online = report.online,
            "listing reconciled"
        );
        Ok(report)
    }

    async fn draft(
        &self,
        item_vid: &str,
        category_id: i64,
        region: i32,
    ) -> Result<Draft, SyncError> {
        let raw = self
            .staging
            .vendor_product(item_vid)
            .await?
            .ok_or_else(|| SyncError::MissingProduct {
                item_vid: item_vid.to_string(),
            })?;
        let product =
            VendorProduct::from_value(raw).map_err(|source| SyncError::MalformedProduct {
                item_vid: item_vid.to_string(),
                source,
            })?;
        let weight = WeightClass::lookup(product.weight_type)?;

        let category_name = self
            .catalog
            .category_name(category_id)
            .await?
            .ok_or(SyncError::MissingCategory(category_id))?;

        let specs = resolve_specs(self.catalog.as_ref(), self.ids.as_ref(), &product.sku_list)
            .await?;

        let gallery = distinct_images(
            split_images(&product.item_view_image)
                .into_iter()
                .chain(split_images(&product.list_grid_image)),
        );
        let images = distinct_images(
            gallery
                .iter()
                .cloned()
                .chain(split_images(&product.color_imgs)),
        );

        let content = ListingContent {
            title: product.item_title.clone(),
            desc: product.item_title.clone(),
            images,
            specs: specs.groups(),
            unit: LISTING_UNIT.to_string(),
            package: Package::with_weight(weight.effective_weight()),
            regions: vec![region],
            category_id,
            category_name,
            store_id: STORE_ID,
            status: ListingStatus::Offline,
        };

        Ok(Draft {
            product,
            weight,
            specs,
            gallery,
            content,
        })
    }

    async fn refresh_listing(
        &mut self,
        item_vid: &str,
        existing: ListingRef,
        draft: &Draft,
        region: i32,
    ) -> Result<ImportReport, SyncError> {
        let listing_id = existing.id;
        if !self
            .catalog
            .update_listing_content(listing_id, item_vid, &draft.content)
            .await?
        {
            tracing::warn!(item_vid, listing_id, "listing content update not acknowledged");
            return Ok(ImportReport::not_acknowledged(item_vid, listing_id));
        }
        self.notifier
            .publish(&IndexMessage::update(
                listing_id,
                content_update_data(&draft.content),
            ))
            .await;

        // SKUs gone from the vendor record stay offline; the rest come back
        // through the upsert.
        let swept = self.catalog.offline_skus(listing_id).await?;
        tracing::debug!(listing_id, swept, "skus set offline before refresh");

        let summary = self.sync_skus(listing_id, draft, region).await?;
        let online = self.finish_listing(listing_id, &summary, draft, region).await?;
        if online && !existing.status.is_online() {
            self.count(StoreCounter::Online).await?;
        }

        Ok(ImportReport {
            item_vid: item_vid.to_string(),
            listing_id,
            outcome: ListingOutcome::Updated,
            skus_created: summary.created,
            skus_updated: summary.updated,
            online,
        })
    }

    async fn create_listing(
        &mut self,
        item_vid: &str,
        draft: &Draft,
        region: i32,
    ) -> Result<ImportReport, SyncError> {
        let listing = NewListing {
            id: self.ids.next_id(IdKind::Listing).await?,
            id_by_vendor: item_vid.to_string(),
            content: draft.content.clone(),
            vendor_id: VENDOR_ID,
            store_category_id: STORE_CATEGORY_ID,
            spu_id: -1,
            thing_id: -1,
            locations: vec![LISTING_LOCATION.to_string()],
        };
        let listing_id = listing.id;

        if !self.catalog.insert_listing(&listing).await? {
            tracing::warn!(item_vid, listing_id, "listing insert not acknowledged");
            return Ok(ImportReport::not_acknowledged(item_vid, listing_id));
        }
        self.notifier
            .publish(&IndexMessage::insert(listing_id, insert_data(&listing)))
            .await;
        self.count(StoreCounter::Listing).await?;

        let summary = self.sync_skus(listing_id, draft, region).await?;
        let online = self.finish_listing(listing_id, &summary, draft, region).await?;
        if online {
            self.count(StoreCounter::Online).await?;
        }

        Ok(ImportReport {
            item_vid: item_vid.to_string(),
            listing_id,
            outcome: ListingOutcome::Created,
            skus_created: summary.created,
            skus_updated: summary.updated,
            online,
        })
    }

    async fn sync_skus(
        &self,
        listing_id: i64,
        draft: &Draft,
        region: i32,
    ) -> Result<SkuSummary, SyncError> {
        let pass = SkuPass {
            listing_id,
            title: &draft.content.title,
            region,
            weight: &draft.weight,
            rules: &self.rules,
            gallery: &draft.gallery,
        };
        upsert_skus(
            self.catalog.as_ref(),
            self.ids.as_ref(),
            &draft.specs,
            pass,
            &draft.product.sku_list,
        )
        .await
    }

    /// Writes the aggregates and notifies. Returns whether the listing is
    /// online after the pass.
    async fn finish_listing(
        &mut self,
        listing_id: i64,
        summary: &SkuSummary,
        draft: &Draft,
        region: i32,
    ) -> Result<bool, SyncError> {
        let aggregates = aggregate(summary, region, draft.product.is_active());
        if !self
            .catalog
            .update_listing_aggregates(listing_id, &aggregates)
            .await?
        {
            tracing::warn!(listing_id, "listing aggregate update not acknowledged");
            return Ok(false);
        }
        if let Some(data) = aggregate_data(&aggregates) {
            self.notifier
                .publish(&IndexMessage::update(listing_id, data))
                .await;
        }
        Ok(aggregates.online)
    }

    async fn count(&self, counter: StoreCounter) -> Result<(), SyncError> {
        if !self
            .catalog
            .increment_store_counter(STORE_CATEGORY_ID, counter)
            .await?
        {
            tracing::warn!(
                store_category_id = STORE_CATEGORY_ID,
                ?counter,
                "store counter update not acknowledged"
            );
        }
        Ok(())
    }
}
