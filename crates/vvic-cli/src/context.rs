//! Wiring shared by the `detail` and `import` commands.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use vvic_core::AppConfig;
use vvic_db::{PgCatalog, PgQueue, PgQueueConnector, PoolConfig};
use vvic_sync::{run_worker, ChangeNotifier, JobHandler, Reconciler, WorkerOptions};

pub(crate) fn worker_options(config: &AppConfig, drain: bool) -> WorkerOptions {
    WorkerOptions {
        poll_interval: Duration::from_millis(config.worker_poll_interval_ms),
        drain,
    }
}

/// Connector for the search-index notifications. The index queue lives in
/// the same Postgres database as the job queues.
pub(crate) fn index_connector(config: &AppConfig) -> PgQueueConnector {
    PgQueueConnector::new(
        &config.database_url,
        PoolConfig {
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: config.queue_connect_timeout_secs,
        },
        Duration::from_secs(config.queue_connect_timeout_secs),
    )
}

/// A reconciler over the Postgres catalog, the ID service and the index
/// queue, with its fixed properties bootstrapped.
pub(crate) async fn reconciler(
    config: &AppConfig,
    pool: PgPool,
) -> anyhow::Result<Reconciler<PgQueueConnector>> {
    let catalog = Arc::new(PgCatalog::new(pool));
    let ids = Arc::new(vvic_client::IdsClient::new(
        &config.ids_url,
        config.http_timeout_secs,
    )?);
    let notifier = ChangeNotifier::new(index_connector(config), config.index_queue.clone())
        .with_max_retries(config.notify_max_retries);

    let reconciler = Reconciler::new(catalog.clone(), catalog, ids, notifier);
    reconciler.bootstrap().await?;
    Ok(reconciler)
}

/// Runs a worker until it drains or the process is asked to stop.
pub(crate) async fn work<H: JobHandler>(
    pool: PgPool,
    queue_name: &str,
    handler: &mut H,
    options: WorkerOptions,
) -> anyhow::Result<()> {
    let queue = PgQueue::new(pool);
    tracing::info!(queue = queue_name, worker_id = %queue.worker_id(), "starting worker");

    tokio::select! {
        result = run_worker(&queue, queue_name, handler, options) => {
            let stats = result?;
            println!(
                "{queue_name}: {} succeeded, {} failed, {} discarded",
                stats.succeeded, stats.failed, stats.discarded
            );
        }
        () = crate::shutdown_signal() => {}
    }
    Ok(())
}
