//! Queue names and message bodies exchanged between producer, workers and
//! the downstream search indexer.

use serde::{Deserialize, Deserializer, Serialize};

/// Durable queue carrying [`DetailJob`]s.
pub const DETAIL_QUEUE: &str = "vvic-product-detail";
/// Durable queue carrying [`ImportJob`]s.
pub const IMPORT_QUEUE: &str = "vvic-immigrate";

/// Fetch and stage the detail of one VVIC item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailJob {
    pub item_vid: String,
}

/// Reconcile one staged VVIC item into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportJob {
    pub item_vid: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub category_id: i64,
    pub region: i32,
}

/// Seed files hand category ids over as text; accept both shapes.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("{n} is not an integer"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid integer '{s}': {e}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected an integer, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOperation {
    Insert,
    Update,
}

/// Change notification consumed by the search-index updater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMessage {
    pub operation: IndexOperation,
    pub listing_id: i64,
    /// The changed fields, keyed by their catalog field names.
    pub data: serde_json::Value,
}

impl IndexMessage {
    #[must_use]
    pub fn insert(listing_id: i64, data: serde_json::Value) -> Self {
        Self {
            operation: IndexOperation::Insert,
            listing_id,
            data,
        }
    }

    #[must_use]
    pub fn update(listing_id: i64, data: serde_json::Value) -> Self {
        Self {
            operation: IndexOperation::Update,
            listing_id,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_job_accepts_string_category() {
        let job: ImportJob = serde_json::from_value(json!({
            "item_vid": "v1",
            "category_id": " 1203 ",
            "region": 1
        }))
        .unwrap();
        assert_eq!(job.category_id, 1203);
    }

    #[test]
    fn import_job_rejects_non_numeric_category() {
        let job = serde_json::from_value::<ImportJob>(json!({
            "item_vid": "v1",
            "category_id": "dresses",
            "region": 1
        }));
        assert!(job.is_err());
    }

    #[test]
    fn index_message_wire_shape() {
        let msg = IndexMessage::update(42, json!({ "status": 1 }));
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            wire,
            json!({ "operation": "update", "listingId": 42, "data": { "status": 1 } })
        );
    }
}
