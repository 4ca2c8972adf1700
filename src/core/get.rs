// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::error::Error;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use reqwest::header::HeaderMap;
use tracing::info;

/// Header telling the cache in front of the source not to serve or
/// populate its cache for the request
pub const CACHE_BYPASS_HEADER: &str = "x-no-copy";
pub const CACHE_BYPASS_VALUE: &str = "1";

/// Header the cache uses to report whether it served the response
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Body of a source object, delivered chunk by chunk
pub type SourceBody = BoxStream<'static, Result<Bytes, Error>>;

/// Where objects are read from
#[async_trait]
pub trait SourceTransport: Send + Sync {
    /// Address of `object_name`, used in logs and errors
    fn object_url(&self, object_name: &str) -> String;

    /// Returns the response headers of a header-only request for `object_name`
    async fn head_object(&self, object_name: &str) -> Result<HeaderMap, Error>;

    /// Returns the body of `object_name` as a stream
    async fn get_object(&self, object_name: &str) -> Result<SourceBody, Error>;
}

/// `SourceTransport` reading objects over HTTP(S) through a cache domain
#[derive(Debug, Clone)]
pub struct CacheSource {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl CacheSource {
    /// Constructs a source for `base_url`, e.g. `https://cdn.example.com`
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let source = CacheSource::new("https://cdn.example.com");
    ///
    /// let headers = source.head_object("shark.jpg").await?;
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SourceTransport for CacheSource {
    fn object_url(&self, object_name: &str) -> String {
        format!("{}/{}", self.base_url, object_name)
    }

    async fn head_object(&self, object_name: &str) -> Result<HeaderMap, Error> {
        let response = self
            .client
            .head(self.object_url(object_name))
            .header(CACHE_BYPASS_HEADER, CACHE_BYPASS_VALUE)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.headers().clone())
    }

    async fn get_object(&self, object_name: &str) -> Result<SourceBody, Error> {
        let response = self
            .client
            .get(self.object_url(object_name))
            .header(CACHE_BYPASS_HEADER, CACHE_BYPASS_VALUE)
            .send()
            .await?
            .error_for_status()?;

        if let Some(cache_status) = response
            .headers()
            .get(CACHE_STATUS_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            info!("Cache {}", cache_status);
        }

        Ok(response.bytes_stream().map_err(Error::from).boxed())
    }
}
