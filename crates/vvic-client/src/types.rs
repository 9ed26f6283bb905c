//! VVIC item detail API response types.

use serde::Deserialize;

/// Envelope of the item detail endpoint: `{"status": 200, "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub status: i64,
    #[serde(default)]
    pub data: Option<DetailData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailData {
    #[serde(default)]
    pub item_list: Vec<serde_json::Value>,
}

/// Result of a detail request that reached the API.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// `status == 200`; the raw item documents, possibly none.
    Found(Vec<serde_json::Value>),
    /// Any other status; `body` is the response text as received.
    Rejected { status: i64, body: String },
}
