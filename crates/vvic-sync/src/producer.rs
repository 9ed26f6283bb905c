//! Job producers for the detail and import queues.
//!
//! Each run starts a fresh batch: the queue is declared, purged of whatever
//! is still pending, then filled.

use serde::Serialize;
use vvic_core::{DetailJob, ImportJob, MessageQueue, StagingStore, DETAIL_QUEUE, IMPORT_QUEUE};

use crate::error::SyncError;
use crate::seed::SeedRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    pub purged: u64,
    pub published: usize,
}

/// Import jobs for every seed row. Rows whose category id is not an integer
/// are logged and counted as skipped.
#[must_use]
pub fn import_jobs_from_seed(rows: &[SeedRow], region: i32) -> (Vec<ImportJob>, usize) {
    let mut skipped = 0usize;
    let jobs = rows
        .iter()
        .filter_map(|row| match row.category_id.parse::<i64>() {
            Ok(category_id) => Some(ImportJob {
                item_vid: row.item_vid.clone(),
                category_id,
                region,
            }),
            Err(err) => {
                tracing::warn!(
                    item_vid = %row.item_vid,
                    category_id = %row.category_id,
                    error = %err,
                    "seed row with invalid category id skipped"
                );
                skipped += 1;
                None
            }
        })
        .collect();
    (jobs, skipped)
}

/// Import jobs for every staged item, all under one category.
///
/// # Errors
///
/// Returns [`SyncError::Store`] if the staged ids cannot be listed.
pub async fn import_jobs_from_staging(
    staging: &dyn StagingStore,
    category_id: i64,
    region: i32,
) -> Result<Vec<ImportJob>, SyncError> {
    Ok(staging
        .vendor_item_vids()
        .await?
        .into_iter()
        .map(|item_vid| ImportJob {
            item_vid,
            category_id,
            region,
        })
        .collect())
}

/// Detail jobs for a list of item ids.
#[must_use]
pub fn detail_jobs<I>(item_vids: I) -> Vec<DetailJob>
where
    I: IntoIterator<Item = String>,
{
    item_vids
        .into_iter()
        .map(|item_vid| DetailJob { item_vid })
        .collect()
}

/// Replaces the pending detail jobs with `jobs`.
///
/// # Errors
///
/// Returns [`SyncError::Queue`] on a queue failure or [`SyncError::Payload`]
/// if a job cannot be encoded.
pub async fn enqueue_detail_jobs(
    queue: &dyn MessageQueue,
    jobs: &[DetailJob],
) -> Result<EnqueueReport, SyncError> {
    publish_batch(queue, DETAIL_QUEUE, jobs).await
}

/// Replaces the pending import jobs with `jobs`.
///
/// # Errors
///
/// Returns [`SyncError::Queue`] on a queue failure or [`SyncError::Payload`]
/// if a job cannot be encoded.
pub async fn enqueue_import_jobs(
    queue: &dyn MessageQueue,
    jobs: &[ImportJob],
) -> Result<EnqueueReport, SyncError> {
    publish_batch(queue, IMPORT_QUEUE, jobs).await
}

async fn publish_batch<T: Serialize>(
    queue: &dyn MessageQueue,
    name: &str,
    jobs: &[T],
) -> Result<EnqueueReport, SyncError> {
    queue.declare_queue(name).await?;
    let purged = queue.purge(name).await?;
    if purged > 0 {
        tracing::info!(queue = name, purged, "pending jobs purged");
    }

    for job in jobs {
        let payload = serde_json::to_string(job).map_err(SyncError::Payload)?;
        queue.publish(name, &payload).await?;
    }
    tracing::info!(queue = name, published = jobs.len(), "jobs enqueued");

    Ok(EnqueueReport {
        purged,
        published: jobs.len(),
    })
}
