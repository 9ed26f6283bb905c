use std::path::PathBuf;

use thiserror::Error;
use vvic_client::VendorError;
use vvic_core::{IdError, QueueError, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("id service error: {0}")]
    Id(#[from] IdError),

    #[error("vendor API error: {0}")]
    Vendor(#[from] VendorError),

    #[error("no staged vendor product for item_vid {item_vid}")]
    MissingProduct { item_vid: String },

    #[error("staged vendor product {item_vid} is malformed: {source}")]
    MalformedProduct {
        item_vid: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown weight class {0}")]
    UnknownWeightClass(u8),

    #[error("price for {context} does not fit an integer")]
    PriceOverflow { context: String },

    #[error("category {0} does not exist")]
    MissingCategory(i64),

    #[error("property value '{value}' could not be resolved")]
    UnresolvedPropertyValue { value: String },

    #[error("invalid job payload: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("seed file error: {0}")]
    Seed(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
