//! `import` command handlers: produce, consume and run reconciliations.

use std::path::PathBuf;

use clap::Subcommand;
use sqlx::PgPool;
use vvic_core::{AppConfig, IMPORT_QUEUE};
use vvic_db::{PgCatalog, PgQueue};
use vvic_sync::{
    enqueue_import_jobs, import_jobs_from_seed, import_jobs_from_staging, read_seed_file,
    ImportHandler,
};

use crate::context::{reconciler, work, worker_options};

/// Sub-commands available under `import`.
#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Replace the pending import jobs with a fresh batch
    Enqueue {
        /// Seed file (`category_id,item_vid` with a header row)
        #[arg(long, conflicts_with = "category_id", required_unless_present = "category_id")]
        seed: Option<PathBuf>,
        /// Import every staged item into this category
        #[arg(long)]
        category_id: Option<i64>,
        /// Region the prices are written for; defaults to the configured one
        #[arg(long)]
        region: Option<i32>,
    },
    /// Consume import jobs
    Work {
        /// Exit once the queue is empty instead of polling
        #[arg(long)]
        drain: bool,
    },
    /// Reconcile a single staged item
    Run {
        /// VVIC item id
        item_vid: String,
        /// Target category id
        category_id: i64,
        #[arg(long)]
        region: Option<i32>,
    },
}

pub(crate) async fn run(
    command: ImportCommands,
    config: &AppConfig,
    pool: PgPool,
) -> anyhow::Result<()> {
    match command {
        ImportCommands::Enqueue {
            seed,
            category_id,
            region,
        } => {
            let region = region.unwrap_or(config.default_region);
            let (jobs, skipped) = match (seed, category_id) {
                (Some(path), _) => import_jobs_from_seed(&read_seed_file(&path)?, region),
                (None, Some(category_id)) => {
                    let staging = PgCatalog::new(pool.clone());
                    (
                        import_jobs_from_staging(&staging, category_id, region).await?,
                        0,
                    )
                }
                (None, None) => anyhow::bail!("either --seed or --category-id is required"),
            };
            let queue = PgQueue::new(pool);
            let report = enqueue_import_jobs(&queue, &jobs).await?;
            println!(
                "{IMPORT_QUEUE}: purged {}, enqueued {}, skipped {skipped}",
                report.purged, report.published
            );
        }
        ImportCommands::Work { drain } => {
            let mut handler = ImportHandler::new(reconciler(config, pool.clone()).await?);
            work(pool, IMPORT_QUEUE, &mut handler, worker_options(config, drain)).await?;
        }
        ImportCommands::Run {
            item_vid,
            category_id,
            region,
        } => {
            let region = region.unwrap_or(config.default_region);
            let mut reconciler = reconciler(config, pool).await?;
            let report = reconciler
                .import_listing(&item_vid, category_id, region)
                .await?;
            println!(
                "{item_vid}: listing {} {:?}, {} sku(s) created, {} updated, online={}",
                report.listing_id,
                report.outcome,
                report.skus_created,
                report.skus_updated,
                report.online
            );
        }
    }
    Ok(())
}
