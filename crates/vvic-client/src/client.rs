//! HTTP client for the VVIC item detail API.
//!
//! Every request carries `app_id`, a millisecond `timestamp` and a `sign`
//! computed from both (see [`crate::sign`]). The API answers HTTP 200 with
//! its own `status` field in the body; anything but `200` there is a
//! rejection, surfaced as [`DetailOutcome::Rejected`] rather than an error.

use std::time::Duration;

use reqwest::{header, Client, Url};
use vvic_core::AppConfig;

use crate::error::VendorError;
use crate::retry::retry_once;
use crate::sign::sign;
use crate::types::{DetailOutcome, DetailResponse};

const API_SUCCESS: i64 = 200;

/// Client for the VVIC item detail endpoint.
///
/// Use [`VvicClient::from_config`] in production or
/// [`VvicClient::with_endpoint`] to point at a mock server in tests.
pub struct VvicClient {
    client: Client,
    app_id: String,
    app_secret: String,
    lang: String,
    endpoint: Url,
}

impl std::fmt::Debug for VvicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VvicClient")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[redacted]")
            .field("lang", &self.lang)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl VvicClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VendorError::InvalidUrl`] if the
    /// configured endpoint is not a valid URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, VendorError> {
        Self::with_endpoint(
            &config.vvic_app_id,
            &config.vvic_app_secret,
            &config.vvic_lang,
            config.http_timeout_secs,
            &config.vvic_endpoint,
        )
    }

    /// Creates a client for an explicit endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VendorError::InvalidUrl`] if `endpoint`
    /// is not a valid URL.
    pub fn with_endpoint(
        app_id: &str,
        app_secret: &str,
        lang: &str,
        timeout_secs: u64,
        endpoint: &str,
    ) -> Result<Self, VendorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vvic-sync/0.1")
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| VendorError::InvalidUrl {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            app_id: app_id.to_owned(),
            app_secret: app_secret.to_owned(),
            lang: lang.to_owned(),
            endpoint,
        })
    }

    /// Fetches the detail record(s) of one VVIC item.
    ///
    /// A connect or timeout failure is retried once, immediately, with the
    /// same signed URL.
    ///
    /// # Errors
    ///
    /// - [`VendorError::Http`] on network failure or a non-2xx HTTP status.
    /// - [`VendorError::Deserialize`] if the body is not the expected envelope.
    /// - [`VendorError::Signing`] if the request cannot be signed.
    pub async fn fetch_detail(&self, item_vid: &str) -> Result<DetailOutcome, VendorError> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let url = self.build_url(item_vid, timestamp_ms)?;

        let body = retry_once(|| self.request_text(&url)).await?;
        Self::parse_detail(item_vid, body)
    }

    /// Builds the signed request URL with percent-encoded query parameters.
    fn build_url(&self, item_vid: &str, timestamp_ms: i64) -> Result<Url, VendorError> {
        let signature = sign(&self.app_id, &self.app_secret, timestamp_ms)?;
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("app_id", &self.app_id)
            .append_pair("timestamp", &timestamp_ms.to_string())
            .append_pair("sign", &signature)
            .append_pair("lang", &self.lang)
            .append_pair("item_vid", item_vid);
        Ok(url)
    }

    async fn request_text(&self, url: &Url) -> Result<String, VendorError> {
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }

    fn parse_detail(item_vid: &str, body: String) -> Result<DetailOutcome, VendorError> {
        let envelope: DetailResponse =
            serde_json::from_str(&body).map_err(|e| VendorError::Deserialize {
                context: format!("item detail(item_vid={item_vid})"),
                source: e,
            })?;

        if envelope.status == API_SUCCESS {
            let items = envelope.data.unwrap_or_default().item_list;
            Ok(DetailOutcome::Found(items))
        } else {
            Ok(DetailOutcome::Rejected {
                status: envelope.status,
                body,
            })
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
