pub mod detail;
pub mod error;
pub mod images;
pub mod listing;
pub mod notify;
pub mod pricing;
pub mod producer;
pub mod props;
pub mod reconcile;
pub mod seed;
pub mod skus;
pub mod worker;

pub use detail::{DetailFetcher, FetchOutcome};
pub use error::SyncError;
pub use notify::ChangeNotifier;
pub use pricing::{round_price_ending, PricingRules, Quote, WeightClass};
pub use producer::{
    detail_jobs, enqueue_detail_jobs, enqueue_import_jobs, import_jobs_from_seed,
    import_jobs_from_staging, EnqueueReport,
};
pub use reconcile::{ImportReport, ListingOutcome, Reconciler};
pub use seed::{read_seed, read_seed_file, SeedRow};
pub use worker::{run_worker, DetailHandler, ImportHandler, JobHandler, WorkerOptions, WorkerStats};
