//! Staged VVIC records as returned by the item detail API.
//!
//! The raw JSON document is what gets staged; these types are the typed view
//! the reconciliation core reads back out of it. VVIC is loose about whether
//! ids and prices arrive as strings or numbers, so those fields accept both.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// One VVIC item (a future catalog listing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProduct {
    #[serde(deserialize_with = "string_or_number")]
    pub item_vid: String,
    #[serde(default)]
    pub item_title: String,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub price: Option<Decimal>,
    /// Weight class `1..=8`, see the price engine's weight table.
    pub weight_type: u8,
    /// `1` while the item is on sale at VVIC.
    #[serde(default)]
    pub status: i16,
    /// Comma-separated gallery image URLs.
    #[serde(default)]
    pub item_view_image: String,
    /// Comma-separated list-grid image URLs.
    #[serde(default)]
    pub list_grid_image: String,
    /// Comma-separated per-color image URLs.
    #[serde(default)]
    pub color_imgs: String,
    #[serde(default)]
    pub sku_list: Vec<VendorSku>,
}

impl VendorProduct {
    /// Decode a staged raw document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when required fields are missing or
    /// have the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether VVIC itself lists the item as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == 1
    }
}

/// One purchasable color/size combination of a [`VendorProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSku {
    #[serde(deserialize_with = "string_or_number")]
    pub sku_id: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub color_id: Option<String>,
    #[serde(default)]
    pub size: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub size_id: Option<String>,
    #[serde(default)]
    pub color_img: Option<String>,
    #[serde(deserialize_with = "decimal")]
    pub price: Decimal,
    #[serde(default)]
    pub status: i16,
    /// `1` or `2` signal an out-of-stock SKU.
    #[serde(default)]
    pub is_lack: i16,
}

fn value_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value_to_string(value)
        .ok_or_else(|| serde::de::Error::custom("expected a string or a number"))
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string).filter(|s| !s.is_empty()))
}

fn parse_decimal<E: serde::de::Error>(raw: &str) -> Result<Decimal, E> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| E::custom(format!("invalid price '{raw}': {e}")))
}

fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = string_or_number(deserializer)?;
    parse_decimal(&raw)
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_string_or_number(deserializer)? {
        Some(raw) => parse_decimal(&raw).map(Some),
        None => Ok(None),
    }
}
