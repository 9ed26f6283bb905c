//! Client for the unique-ID service.
//!
//! The service hands out one id per call from a named sequence:
//! `POST {base}/getId` with `{"name": "<sequence>"}` answers `{"id": <i64>}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use vvic_core::{IdError, IdGenerator, IdKind};

use crate::error::VendorError;

#[derive(Debug, Serialize)]
struct GetIdRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GetIdResponse {
    id: i64,
}

#[derive(Debug, Clone)]
pub struct IdsClient {
    client: Client,
    endpoint: Url,
}

impl IdsClient {
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VendorError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, VendorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let invalid = |reason: String| VendorError::InvalidUrl {
            url: base_url.to_owned(),
            reason,
        };
        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("getId"))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Requests the next id of the sequence named by `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] on network failure or a non-2xx status,
    /// or [`VendorError::Deserialize`] if the body has no integer `id`.
    pub async fn get_id(&self, kind: IdKind) -> Result<i64, VendorError> {
        let body = self
            .client
            .post(self.endpoint.clone())
            .json(&GetIdRequest {
                name: kind.as_str(),
            })
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: GetIdResponse =
            serde_json::from_str(&body).map_err(|e| VendorError::Deserialize {
                context: format!("getId(name={kind})"),
                source: e,
            })?;
        Ok(response.id)
    }
}

#[async_trait]
impl IdGenerator for IdsClient {
    async fn next_id(&self, kind: IdKind) -> Result<i64, IdError> {
        let id = self
            .get_id(kind)
            .await
            .map_err(|e| IdError::Unavailable(Box::new(e)))?;
        if id <= 0 {
            return Err(IdError::Invalid {
                kind: kind.to_string(),
                reason: format!("non-positive id {id}"),
            });
        }
        Ok(id)
    }
}
