pub mod client;
pub mod error;
pub mod ids;
pub(crate) mod retry;
pub mod sign;
pub mod types;

pub use client::VvicClient;
pub use error::VendorError;
pub use ids::IdsClient;
pub use sign::sign;
pub use types::DetailOutcome;
