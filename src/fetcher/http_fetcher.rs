use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use wreq::Client;
use wreq_util::Emulation;

use crate::error::PipelineError;

/// Downloads the reference files once and caches them on disk. Presence of
/// the local file is the cache-hit signal; no staleness or checksum handling.
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().emulation(Emulation::Firefox139).build()?;

        Ok(SourceFetcher { client })
    }

    /// Ensure `file_path` exists, downloading it from `remote_url` if not.
    /// On a non-2xx response nothing is written to disk and the pipeline must
    /// halt. Repeated calls with an existing file perform no network I/O.
    pub async fn ensure_local(&self, file_path: &Path, remote_url: &str) -> Result<PathBuf> {
        if file_path.exists() {
            info!("Using cached file: {}", file_path.display());
            return Ok(file_path.to_path_buf());
        }

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        info!("Downloading {} -> {}", remote_url, file_path.display());
        let response = self.client.get(remote_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: remote_url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        // Body is read in full before anything touches disk, so a failed
        // transfer never leaves a partial cache file behind.
        let body = response.bytes().await?;
        std::fs::write(file_path, &body)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        info!("Downloaded {} bytes to {}", body.len(), file_path.display());

        Ok(file_path.to_path_buf())
    }
}
