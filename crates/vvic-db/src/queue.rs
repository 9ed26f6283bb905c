//! Durable named job queues on top of Postgres.
//!
//! Jobs move `pending -> running` and are deleted once acknowledged. A
//! claimed job is locked by the claiming worker with `FOR UPDATE SKIP LOCKED`, so concurrent workers never
//! hold the same job. A rejected job returns to `pending` after a delay; a
//! job whose worker died is reclaimable once its lease expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vvic_core::{Delivery, MessageQueue, QueueConnector, QueueError};

use crate::{connect_pool, DbError, PoolConfig};

/// Seconds a `running` job stays locked before another worker may reclaim it.
const LEASE_SECS: f64 = 600.0;
/// Seconds a rejected job waits before it is handed out again.
const DEFAULT_RETRY_DELAY_SECS: u32 = 30;

/// A row from the `queue_jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueueJobRow {
    pub id: i64,
    pub queue: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub locked_by: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

const JOB_COLUMNS: &str =
    "id, queue, payload, status, attempts, last_error, locked_by, scheduled_at, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Registers a queue name. Idempotent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn declare_queue(pool: &PgPool, queue: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO job_queues (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(queue)
        .execute(pool)
        .await?;

    Ok(())
}

/// Appends a pending job and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an undeclared
/// queue).
pub async fn enqueue_job(pool: &PgPool, queue: &str, payload: &str) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO queue_jobs (queue, payload) VALUES ($1, $2) RETURNING id",
    )
    .bind(queue)
    .bind(payload)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Deletes every pending job of a queue. Returns how many were removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn purge_queue(pool: &PgPool, queue: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM queue_jobs WHERE queue = $1 AND status = 'pending'")
        .bind(queue)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Atomically claims the oldest due job of `queue` for `worker_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn claim_next_job(
    pool: &PgPool,
    queue: &str,
    worker_id: Uuid,
) -> Result<Option<QueueJobRow>, DbError> {
    let row = sqlx::query_as::<_, QueueJobRow>(&format!(
        "WITH next AS ( \
             SELECT id FROM queue_jobs \
             WHERE queue = $1 \
               AND ((status = 'pending' AND scheduled_at <= NOW()) \
                 OR (status = 'running' AND locked_at < NOW() - make_interval(secs => $3))) \
             ORDER BY scheduled_at, id \
             FOR UPDATE SKIP LOCKED \
             LIMIT 1 \
         ) \
         UPDATE queue_jobs j \
         SET status = 'running', locked_by = $2, locked_at = NOW(), \
             attempts = j.attempts + 1, updated_at = NOW() \
         FROM next \
         WHERE j.id = next.id \
         RETURNING {}",
        prefixed_job_columns("j")
    ))
    .bind(queue)
    .bind(worker_id)
    .bind(LEASE_SECS)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a job claimed by `worker_id`.
///
/// Returns `false` if the job is no longer held by this worker.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn complete_job(pool: &PgPool, id: i64, worker_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM queue_jobs WHERE id = $1 AND status = 'running' AND locked_by = $2",
    )
    .bind(id)
    .bind(worker_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Returns a claimed job to `pending`, due again after `delay_secs`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn requeue_job(
    pool: &PgPool,
    id: i64,
    worker_id: Uuid,
    error: &str,
    delay_secs: u32,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE queue_jobs \
         SET status = 'pending', last_error = $3, locked_by = NULL, locked_at = NULL, \
             scheduled_at = NOW() + make_interval(secs => $4), updated_at = NOW() \
         WHERE id = $1 AND status = 'running' AND locked_by = $2",
    )
    .bind(id)
    .bind(worker_id)
    .bind(error)
    .bind(f64::from(delay_secs))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Counts pending jobs of a queue.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_pending_jobs(pool: &PgPool, queue: &str) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM queue_jobs WHERE queue = $1 AND status = 'pending'",
    )
    .bind(queue)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

fn prefixed_job_columns(alias: &str) -> String {
    JOB_COLUMNS
        .split(", ")
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// MessageQueue adapter
// ---------------------------------------------------------------------------

/// A [`MessageQueue`] connection identified by its own worker id.
#[derive(Debug, Clone)]
pub struct PgQueue {
    pool: PgPool,
    worker_id: Uuid,
    retry_delay_secs: u32,
}

impl PgQueue {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            worker_id: Uuid::new_v4(),
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }

    /// Delay before a rejected job becomes claimable again.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_secs = u32::try_from(delay.as_secs()).unwrap_or(u32::MAX);
        self
    }

    #[must_use]
    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MessageQueue for PgQueue {
    async fn declare_queue(&self, queue: &str) -> Result<(), QueueError> {
        Ok(declare_queue(&self.pool, queue).await?)
    }

    async fn publish(&self, queue: &str, payload: &str) -> Result<(), QueueError> {
        let id = enqueue_job(&self.pool, queue, payload).await?;
        tracing::debug!(queue, job_id = id, "job enqueued");
        Ok(())
    }

    async fn purge(&self, queue: &str) -> Result<u64, QueueError> {
        Ok(purge_queue(&self.pool, queue).await?)
    }

    async fn claim(&self, queue: &str) -> Result<Option<Delivery>, QueueError> {
        let row = claim_next_job(&self.pool, queue, self.worker_id).await?;
        Ok(row.map(|row| Delivery {
            id: row.id,
            queue: row.queue,
            payload: row.payload,
            attempts: row.attempts,
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        if !complete_job(&self.pool, delivery.id, self.worker_id).await? {
            tracing::warn!(
                job_id = delivery.id,
                queue = %delivery.queue,
                "ack ignored: job is no longer held by this worker"
            );
        }
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery, reason: &str) -> Result<(), QueueError> {
        let requeued = requeue_job(
            &self.pool,
            delivery.id,
            self.worker_id,
            reason,
            self.retry_delay_secs,
        )
        .await?;
        if !requeued {
            tracing::warn!(
                job_id = delivery.id,
                queue = %delivery.queue,
                "reject ignored: job is no longer held by this worker"
            );
        }
        Ok(())
    }
}

/// Opens a fresh pool per connection, bounded by a connect timeout.
#[derive(Clone)]
pub struct PgQueueConnector {
    database_url: String,
    pool_config: PoolConfig,
    connect_timeout: Duration,
}

impl PgQueueConnector {
    #[must_use]
    pub fn new(database_url: &str, pool_config: PoolConfig, connect_timeout: Duration) -> Self {
        Self {
            database_url: database_url.to_string(),
            pool_config,
            connect_timeout,
        }
    }
}

impl std::fmt::Debug for PgQueueConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgQueueConnector")
            .field("database_url", &"[redacted]")
            .field("pool_config", &self.pool_config)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[async_trait]
impl QueueConnector for PgQueueConnector {
    type Queue = PgQueue;

    async fn connect(&self) -> Result<PgQueue, QueueError> {
        let pool = tokio::time::timeout(
            self.connect_timeout,
            connect_pool(&self.database_url, self.pool_config),
        )
        .await
        .map_err(|elapsed| QueueError::Connect(Box::new(elapsed)))?
        .map_err(|e| QueueError::Connect(Box::new(e)))?;

        Ok(PgQueue::new(pool))
    }
}
