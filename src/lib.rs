// Re-export modules
pub mod config;
pub mod discovery;
pub mod download;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod target;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::{DiscoveryError, ExtractionError, FetchError, HarvestError};
pub use pipeline::PageScraper;
pub use results::{DownloadOutcome, DownloadStatus, FamilyInfo, ImageAsset, PageResult, SectionRecord};
pub use target::PageTarget;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};

use transport::Transport;

/// Outcome of harvesting one URL from a batch
#[derive(Debug)]
pub struct PageReport {
    pub url: String,
    pub outcome: Result<PageResult, FetchError>,
}

/// Batch driver: runs the page pipeline over a list of URLs
pub struct Harvest {
    urls: Vec<String>,
    config: HarvestConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl Harvest {
    /// Create a new Harvest over the given page URLs
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            config: HarvestConfig::default(),
            transport: None,
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let config = HarvestConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Apply configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, HarvestError> {
        let config = HarvestConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    /// Override the number of download workers per page
    pub fn with_max_concurrency(mut self, value: usize) -> Self {
        self.config.max_concurrency = value;
        self
    }

    /// Override the number of pages processed at once
    pub fn with_page_concurrency(mut self, value: usize) -> Self {
        self.config.page_concurrency = value;
        self
    }

    /// Override the directory page folders are created under
    pub fn with_destination_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.destination_root = root.into();
        self
    }

    /// Use a custom transport instead of the default `reqwest` client
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Start harvesting and get a receiver yielding one report per URL as
    /// pages complete
    pub async fn generate(self) -> Result<mpsc::Receiver<PageReport>, HarvestError> {
        let page_concurrency = self.config.page_concurrency.max(1);
        let scraper = Arc::new(match self.transport {
            Some(transport) => PageScraper::with_transport(self.config, transport)?,
            None => PageScraper::new(self.config)?,
        });

        ::log::info!(
            "Harvesting {} pages, {} at a time",
            self.urls.len(),
            page_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(page_concurrency));
        let (report_tx, report_rx) = mpsc::channel::<PageReport>(self.urls.len().max(1));

        for url in self.urls {
            let scraper = Arc::clone(&scraper);
            let semaphore = Arc::clone(&semaphore);
            let report_tx = report_tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let outcome = match PageTarget::parse(&url) {
                    Ok(target) => scraper.scrape(&target).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = &outcome {
                    ::log::error!("Failed to harvest {}: {}", url, e);
                }
                if report_tx.send(PageReport { url, outcome }).await.is_err() {
                    ::log::debug!("Report receiver dropped");
                }
            });
        }

        // The channel closes once every page task has reported
        drop(report_tx);

        Ok(report_rx)
    }
}

/// Reads page URLs from a file: one per line, blank lines and `#` comments
/// skipped
pub fn read_url_file(path: impl AsRef<Path>) -> Result<Vec<String>, HarvestError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| HarvestError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
