//! Image download and decoding

use image::RgbaImage;
use tracing::debug;

use crate::{Result, VideoError};

/// Downloads source images over HTTP.
#[derive(Clone, Default)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the body. Non-2xx responses are errors.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |source| VideoError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        let bytes = response.bytes().await.map_err(fetch_err)?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Fetch every URL in order, stopping at the first failure.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(urls.len());
        for url in urls {
            out.push(self.fetch_bytes(url).await?);
        }
        Ok(out)
    }
}

/// Decode downloaded bytes into an RGBA pixel buffer. `url` is only used for errors.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|source| VideoError::Decode {
        url: url.to_string(),
        source,
    })?;
    Ok(img.to_rgba8())
}
