//! Property/value resolution for VVIC colors and sizes.
//!
//! Labels are normalized (trimmed, lowercased) before lookup so that
//! `"Red "` and `"red"` land on the same property value. Values missing from
//! the shared dictionary are created with an id from the ID service.

use vvic_core::{
    CatalogStore, IdGenerator, IdKind, NewPropertyValue, PropertyKind, SpecGroup, SpecValue,
    VendorSku,
};

use crate::error::SyncError;

/// Normalized form used as the dictionary key of a property value.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Makes sure the fixed Color and Size properties exist.
///
/// # Errors
///
/// Returns [`SyncError::Store`] if the store rejects the write.
pub async fn ensure_properties(catalog: &dyn CatalogStore) -> Result<(), SyncError> {
    for kind in [PropertyKind::Color, PropertyKind::Size] {
        catalog.ensure_property(kind).await?;
    }
    Ok(())
}

/// Labels of one property in first-seen order, with their value ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ResolvedValues {
    entries: Vec<(String, i64)>,
}

impl ResolvedValues {
    fn get(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(seen, _)| seen == label)
            .map(|(_, id)| *id)
    }

    fn push(&mut self, label: String, id: i64) {
        self.entries.push((label, id));
    }

    fn spec_values(&self) -> Vec<SpecValue> {
        self.entries
            .iter()
            .map(|(label, id)| SpecValue {
                id: *id,
                value: label.clone(),
            })
            .collect()
    }
}

/// Property values used by the SKUs of one product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSpecs {
    colors: ResolvedValues,
    sizes: ResolvedValues,
}

impl ResolvedSpecs {
    /// The listing's spec groups, `[Color, Size]`, or none for a product
    /// without SKUs.
    #[must_use]
    pub fn groups(&self) -> Vec<SpecGroup> {
        if self.colors.entries.is_empty() && self.sizes.entries.is_empty() {
            return Vec::new();
        }
        [
            (PropertyKind::Color, &self.colors),
            (PropertyKind::Size, &self.sizes),
        ]
        .into_iter()
        .map(|(kind, values)| SpecGroup {
            id: kind.property_id(),
            name: kind.name().to_string(),
            values: values.spec_values(),
        })
        .collect()
    }

    #[must_use]
    pub fn color_id(&self, label: &str) -> Option<i64> {
        self.colors.get(label)
    }

    #[must_use]
    pub fn size_id(&self, label: &str) -> Option<i64> {
        self.sizes.get(label)
    }

    /// SKU lookup key `colorPid:colorPvid;sizePid:sizePvid` for normalized
    /// labels.
    #[must_use]
    pub fn sku_key(&self, color: &str, size: &str) -> Option<String> {
        let color_id = self.color_id(color)?;
        let size_id = self.size_id(size)?;
        Some(format!(
            "{}:{color_id};{}:{size_id}",
            PropertyKind::Color.property_id(),
            PropertyKind::Size.property_id()
        ))
    }

    /// Every distinct value id, colors first.
    #[must_use]
    pub fn value_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::new();
        for (_, id) in self.colors.entries.iter().chain(&self.sizes.entries) {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Resolves the color and size of every SKU, creating missing values, then
/// increments the reference count of each distinct value once.
///
/// # Errors
///
/// Returns [`SyncError::Store`] or [`SyncError::Id`] when a collaborator
/// fails, or [`SyncError::UnresolvedPropertyValue`] when a value can be
/// neither found nor created.
pub async fn resolve_specs(
    catalog: &dyn CatalogStore,
    ids: &dyn IdGenerator,
    skus: &[VendorSku],
) -> Result<ResolvedSpecs, SyncError> {
    let mut specs = ResolvedSpecs::default();

    for sku in skus {
        let color = normalize_label(&sku.color);
        if specs.colors.get(&color).is_none() {
            let id = resolve_value(
                catalog,
                ids,
                PropertyKind::Color,
                &color,
                sku.color_id.as_deref(),
            )
            .await?;
            specs.colors.push(color, id);
        }

        let size = normalize_label(&sku.size);
        if specs.sizes.get(&size).is_none() {
            let id = resolve_value(
                catalog,
                ids,
                PropertyKind::Size,
                &size,
                sku.size_id.as_deref(),
            )
            .await?;
            specs.sizes.push(size, id);
        }
    }

    let value_ids = specs.value_ids();
    if !value_ids.is_empty() {
        let changed = catalog
            .increment_property_value_references(&value_ids)
            .await?;
        if usize::try_from(changed).ok() != Some(value_ids.len()) {
            tracing::warn!(
                expected = value_ids.len(),
                changed,
                "property value reference update touched fewer rows than expected"
            );
        }
    }

    Ok(specs)
}

async fn resolve_value(
    catalog: &dyn CatalogStore,
    ids: &dyn IdGenerator,
    kind: PropertyKind,
    label: &str,
    external_id: Option<&str>,
) -> Result<i64, SyncError> {
    let property_id = kind.property_id();
    if let Some(id) = catalog.find_property_value(property_id, label).await? {
        return Ok(id);
    }

    let value = NewPropertyValue {
        id: ids.next_id(IdKind::PropertyValue).await?,
        property_id,
        value: label.to_string(),
        external_id: external_id.map(str::to_string),
    };
    if catalog.insert_property_value(&value).await? {
        tracing::debug!(property = %kind, value = label, id = value.id, "property value created");
        return Ok(value.id);
    }

    // Another worker created the same value between lookup and insert.
    catalog
        .find_property_value(property_id, label)
        .await?
        .ok_or_else(|| SyncError::UnresolvedPropertyValue {
            value: format!("{kind}:{label}"),
        })
}
