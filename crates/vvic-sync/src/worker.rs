//! Queue consumer loop shared by the detail and import workers.
//!
//! One job is held at a time. A job is acknowledged once its handler
//! returns `Ok`; a handler error hands it back for redelivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use vvic_core::{DetailJob, ImportJob, MessageQueue, QueueConnector};

use crate::detail::DetailFetcher;
use crate::error::SyncError;
use crate::reconcile::Reconciler;

#[async_trait]
pub trait JobHandler: Send {
    type Job: DeserializeOwned + Send;

    async fn handle(&mut self, job: Self::Job) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    /// Sleep between polls of an empty queue.
    pub poll_interval: Duration,
    /// Return as soon as the queue has no claimable job.
    pub drain: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            drain: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: usize,
    pub failed: usize,
    /// Payloads that could not be decoded; acknowledged and discarded.
    pub discarded: usize,
}

/// Consumes `queue_name` until the queue is drained (with
/// [`WorkerOptions::drain`]) or forever.
///
/// # Errors
///
/// Returns [`SyncError::Queue`] if the queue itself fails. Handler errors are
/// counted, not returned.
pub async fn run_worker<Q, H>(
    queue: &Q,
    queue_name: &str,
    handler: &mut H,
    options: WorkerOptions,
) -> Result<WorkerStats, SyncError>
where
    Q: MessageQueue + ?Sized,
    H: JobHandler,
{
    queue.declare_queue(queue_name).await?;
    let mut stats = WorkerStats::default();
    tracing::info!(queue = queue_name, drain = options.drain, "worker started");

    loop {
        let Some(delivery) = queue.claim(queue_name).await? else {
            if options.drain {
                break;
            }
            tokio::time::sleep(options.poll_interval).await;
            continue;
        };

        let job = match serde_json::from_str::<H::Job>(&delivery.payload) {
            Ok(job) => job,
            Err(err) => {
                // Redelivery cannot fix a payload that does not decode.
                tracing::error!(
                    queue = queue_name,
                    job_id = delivery.id,
                    error = %err,
                    "undecodable job discarded"
                );
                queue.ack(&delivery).await?;
                stats.discarded += 1;
                continue;
            }
        };

        match handler.handle(job).await {
            Ok(()) => {
                queue.ack(&delivery).await?;
                stats.succeeded += 1;
            }
            Err(err) => {
                tracing::warn!(
                    queue = queue_name,
                    job_id = delivery.id,
                    attempts = delivery.attempts,
                    error = %err,
                    "job failed, handing back for redelivery"
                );
                queue.reject(&delivery, &err.to_string()).await?;
                stats.failed += 1;
            }
        }
    }

    tracing::info!(
        queue = queue_name,
        succeeded = stats.succeeded,
        failed = stats.failed,
        discarded = stats.discarded,
        "worker drained"
    );
    Ok(stats)
}

/// Runs [`ImportJob`]s through a [`Reconciler`].
pub struct ImportHandler<C: QueueConnector> {
    reconciler: Reconciler<C>,
}

impl<C: QueueConnector> ImportHandler<C> {
    pub fn new(reconciler: Reconciler<C>) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl<C> JobHandler for ImportHandler<C>
where
    C: QueueConnector + 'static,
{
    type Job = ImportJob;

    async fn handle(&mut self, job: ImportJob) -> Result<(), SyncError> {
        self.reconciler
            .import_listing(&job.item_vid, job.category_id, job.region)
            .await?;
        Ok(())
    }
}

/// Runs [`DetailJob`]s through a [`DetailFetcher`].
pub struct DetailHandler {
    fetcher: DetailFetcher,
}

impl DetailHandler {
    #[must_use]
    pub fn new(fetcher: DetailFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobHandler for DetailHandler {
    type Job = DetailJob;

    async fn handle(&mut self, job: DetailJob) -> Result<(), SyncError> {
        self.fetcher.fetch(&job.item_vid).await?;
        Ok(())
    }
}
