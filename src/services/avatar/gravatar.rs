//! Upstream avatar provider protocol
//!
//! One fetch cycle is two sequential requests against the provider:
//!
//! 1. `GET <base><hash>?d=retro&size=200&r=pg` returns the image. Anything
//!    but a 200 fails the cycle and the probe is skipped.
//! 2. `GET <base><hash>?d=404` tells whether the user uploaded an image:
//!    404 means the provider would have generated one.
//!
//! A transport failure on the probe does not fail the cycle since the image
//! is already in hand; the custom flag is then reported as unknown.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::entity::FetchedAvatar;
use crate::config::defaults::{PRIMARY_QUERY, PROBE_QUERY};
use crate::errors::{FetchError, FetchResult};

/// Source of avatar images for the fetch workers
#[async_trait]
pub trait AvatarFetcher: Send + Sync {
    /// Run one complete fetch cycle for `hash`
    async fn fetch(&self, hash: &str) -> FetchResult<FetchedAvatar>;
}

/// Gravatar-compatible provider client
#[derive(Debug, Clone)]
pub struct GravatarClient {
    client: Client,
    base_url: String,
}

impl GravatarClient {
    pub fn new<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn image_url(&self, hash: &str) -> String {
        format!("{}{}?{}", self.base_url, hash, PRIMARY_QUERY)
    }

    pub fn probe_url(&self, hash: &str) -> String {
        format!("{}{}?{}", self.base_url, hash, PROBE_QUERY)
    }

    async fn probe_custom(&self, hash: &str) -> Option<bool> {
        let url = self.probe_url(hash);
        match self.client.get(&url).send().await {
            Ok(response) => Some(response.status() != StatusCode::NOT_FOUND),
            Err(e) => {
                debug!("Custom avatar probe failed for {}: {}", hash, e);
                None
            }
        }
    }
}

#[async_trait]
impl AvatarFetcher for GravatarClient {
    async fn fetch(&self, hash: &str) -> FetchResult<FetchedAvatar> {
        let url = self.image_url(hash);
        debug!("Fetching avatar: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::transport(hash, e))?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::UpstreamStatus {
                hash: hash.to_string(),
                status: response.status().as_u16(),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(hash, e))?;

        let is_custom = self.probe_custom(hash).await;

        debug!(
            "Fetched avatar {} ({} bytes, custom: {:?})",
            hash,
            data.len(),
            is_custom
        );

        Ok(FetchedAvatar { data, is_custom })
    }
}
