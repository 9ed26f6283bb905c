//! `detail` command handlers: produce, consume and run detail fetches.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use sqlx::PgPool;
use vvic_client::VvicClient;
use vvic_core::{AppConfig, StagingStore, DETAIL_QUEUE};
use vvic_db::{PgCatalog, PgQueue};
use vvic_sync::{detail_jobs, enqueue_detail_jobs, read_seed_file, DetailFetcher, DetailHandler};

use crate::context::{work, worker_options};

/// Sub-commands available under `detail`.
#[derive(Debug, Subcommand)]
pub enum DetailCommands {
    /// Replace the pending detail jobs with a fresh batch
    Enqueue {
        /// Seed file (`category_id,item_vid` with a header row); defaults to
        /// every item already staged
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Consume detail jobs
    Work {
        /// Exit once the queue is empty instead of polling
        #[arg(long)]
        drain: bool,
    },
    /// Fetch and stage a single item
    Fetch {
        /// VVIC item id
        item_vid: String,
    },
}

pub(crate) async fn run(
    command: DetailCommands,
    config: &AppConfig,
    pool: PgPool,
) -> anyhow::Result<()> {
    match command {
        DetailCommands::Enqueue { seed } => {
            let item_vids: Vec<String> = match seed {
                Some(path) => read_seed_file(&path)?
                    .into_iter()
                    .map(|row| row.item_vid)
                    .collect(),
                None => PgCatalog::new(pool.clone()).vendor_item_vids().await?,
            };
            let queue = PgQueue::new(pool);
            let report = enqueue_detail_jobs(&queue, &detail_jobs(item_vids)).await?;
            println!(
                "{DETAIL_QUEUE}: purged {}, enqueued {}",
                report.purged, report.published
            );
        }
        DetailCommands::Work { drain } => {
            let mut handler = DetailHandler::new(fetcher(config, pool.clone())?);
            work(pool, DETAIL_QUEUE, &mut handler, worker_options(config, drain)).await?;
        }
        DetailCommands::Fetch { item_vid } => {
            let outcome = fetcher(config, pool)?.fetch(&item_vid).await?;
            println!("{item_vid}: {outcome:?}");
        }
    }
    Ok(())
}

fn fetcher(config: &AppConfig, pool: PgPool) -> anyhow::Result<DetailFetcher> {
    let client = VvicClient::from_config(config)?;
    let staging = Arc::new(PgCatalog::new(pool));
    Ok(DetailFetcher::new(
        client,
        staging,
        config.failure_log_path.clone(),
    ))
}
