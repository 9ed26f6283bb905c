//! Single immediate retry for transport failures.
//!
//! [`retry_once`] runs an operation and, when it fails with a connect or
//! timeout error, runs it exactly once more. Every other error (HTTP status
//! errors included) is returned as-is.

use std::future::Future;

use crate::error::VendorError;

/// Returns `true` for errors worth one more attempt.
pub(crate) fn is_retriable(err: &VendorError) -> bool {
    match err {
        VendorError::Http(e) => e.is_timeout() || e.is_connect(),
        VendorError::Signing(_) | VendorError::InvalidUrl { .. } | VendorError::Deserialize { .. } => {
            false
        }
    }
}

pub(crate) async fn retry_once<T, F, Fut>(mut operation: F) -> Result<T, VendorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VendorError>>,
{
    match operation().await {
        Err(err) if is_retriable(&err) => {
            tracing::warn!(error = %err, "transient transport error, retrying once");
            operation().await
        }
        other => other,
    }
}
