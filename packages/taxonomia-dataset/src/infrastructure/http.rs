//! HTTP picture fetcher (reqwest)

use async_trait::async_trait;
use reqwest::Client;

use crate::config::PictureCacheConfig;
use crate::domain::PictureFetcher;
use crate::error::{DatasetError, Result};

/// Downloads picture blobs with a shared client.
///
/// No request timeout is configured, see [`PictureCacheConfig`].
#[derive(Clone)]
pub struct HttpPictureFetcher {
    client: Client,
}

impl HttpPictureFetcher {
    pub fn new(config: &PictureCacheConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DatasetError::config(format!("Cannot build HTTP client: {}", e)).with_source(e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PictureFetcher for HttpPictureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
