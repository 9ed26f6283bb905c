//! Fetch-and-stage of VVIC item details.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use vvic_client::{DetailOutcome, VvicClient};
use vvic_core::StagingStore;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Number of item documents staged.
    Staged(usize),
    /// The API rejected the request; the body went to the failure log.
    Rejected,
}

pub struct DetailFetcher {
    client: VvicClient,
    staging: Arc<dyn StagingStore>,
    failure_log: PathBuf,
}

impl DetailFetcher {
    pub fn new(
        client: VvicClient,
        staging: Arc<dyn StagingStore>,
        failure_log: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            staging,
            failure_log: failure_log.into(),
        }
    }

    #[must_use]
    pub fn failure_log(&self) -> &Path {
        &self.failure_log
    }

    /// Fetches one item from VVIC and stages every returned document under
    /// its own `item_vid`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Vendor`] if the request fails after its retry,
    /// [`SyncError::Store`] if staging fails, or [`SyncError::Io`] if the
    /// failure log cannot be written.
    pub async fn fetch(&self, item_vid: &str) -> Result<FetchOutcome, SyncError> {
        match self.client.fetch_detail(item_vid).await? {
            DetailOutcome::Found(items) => {
                let mut staged = 0usize;
                for item in items {
                    let Some(vid) = item_vid_of(&item) else {
                        tracing::warn!(item_vid, "detail item without item_vid skipped");
                        continue;
                    };
                    self.staging.upsert_vendor_product(&vid, &item).await?;
                    staged += 1;
                }
                tracing::info!(item_vid, staged, "vendor detail staged");
                Ok(FetchOutcome::Staged(staged))
            }
            DetailOutcome::Rejected { status, body } => {
                tracing::warn!(item_vid, status, "vendor detail rejected");
                append_failure(&self.failure_log, item_vid, &body).await?;
                Ok(FetchOutcome::Rejected)
            }
        }
    }
}

fn item_vid_of(item: &serde_json::Value) -> Option<String> {
    match item.get("item_vid")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Appends `item_vid\nbody\n` to the failure log, creating it if needed.
async fn append_failure(path: &Path, item_vid: &str, body: &str) -> Result<(), SyncError> {
    let io_err = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(format!("{item_vid}\n{body}\n").as_bytes())
        .await
        .map_err(io_err)?;
    file.flush().await.map_err(io_err)
}
