//! Request signing for the VVIC open API.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::VendorError;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 keyed with `app_secret` over
/// `app_id + app_secret + timestamp_ms`.
///
/// # Errors
///
/// Returns [`VendorError::Signing`] if the secret is rejected as an HMAC key.
pub fn sign(app_id: &str, app_secret: &str, timestamp_ms: i64) -> Result<String, VendorError> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| VendorError::Signing(e.to_string()))?;
    mac.update(app_id.as_bytes());
    mac.update(app_secret.as_bytes());
    mac.update(timestamp_ms.to_string().as_bytes());
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}
