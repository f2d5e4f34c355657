//! Archive downloads over HTTP/HTTPS.
//!
//! Bodies are streamed into a `.part` sibling and renamed into place only
//! once the transfer completes, so an interrupted download never leaves a
//! file at the final path.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Something that can place a remote archive at a local path.
pub trait ArchiveFetcher {
    /// Download `url` to `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Fetches archives with a blocking reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default 300-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(300))
    }

    /// Create a new HTTP fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("opendr-build/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("GET {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let part = partial_path(dest);
        let written = (|| -> Result<u64> {
            let mut writer = BufWriter::new(File::create(&part)?);
            let written = response.copy_to(&mut writer)?;
            writer.flush()?;
            Ok(written)
        })();

        let written = match written {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&part);
                return Err(e.context(format!("Download of {} interrupted", url)));
            }
        };

        fs::rename(&part, dest)
            .with_context(|| format!("Failed to move download to {}", dest.display()))?;

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

/// Temporary download path for `dest`.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
