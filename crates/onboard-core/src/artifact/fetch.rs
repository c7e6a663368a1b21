//! Artifact downloads.

use anyhow::Context;

/// Downloads a URL into memory. Implemented by [`HttpFetcher`] and by test fakes.
pub trait ArtifactFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Fetches over HTTP(S) with reqwest on a private tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl HttpFetcher {
    async fn download(url: &str) -> anyhow::Result<Vec<u8>> {
        let response = reqwest::get(url)
            .await
            .with_context(|| format!("Failed to download artifact from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download artifact: HTTP {} from {}",
                response.status(),
                url
            );
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(bytes.to_vec())
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;
        runtime.block_on(Self::download(url))
    }
}
