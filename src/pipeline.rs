use std::sync::Arc;

use crate::config::HarvestConfig;
use crate::download::AssetDownloader;
use crate::error::{FetchError, HarvestError};
use crate::fetcher::DocumentFetcher;
use crate::parsers::{self, Layout, PageExtract};
use crate::results::PageResult;
use crate::target::PageTarget;
use crate::transport::{ReqwestTransport, Transport};

/// Runs the fetch, extract and download pipeline for single pages.
///
/// Holds no per-page state, so one instance can serve many pages at once.
pub struct PageScraper {
    config: HarvestConfig,
    layout: Layout,
    fetcher: DocumentFetcher,
    downloader: AssetDownloader,
}

impl PageScraper {
    /// Builds a scraper using `reqwest` for all requests
    pub fn new(config: HarvestConfig) -> Result<Self, HarvestError> {
        let transport = ReqwestTransport::new(config.request_timeout(), &config.user_agent)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds a scraper around a caller-supplied transport
    pub fn with_transport(
        config: HarvestConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, HarvestError> {
        let layout = Layout::compile(&config.layout)?;
        Ok(Self {
            fetcher: DocumentFetcher::new(Arc::clone(&transport)),
            downloader: AssetDownloader::new(transport, config.max_concurrency),
            layout,
            config,
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Scrapes one page.
    ///
    /// Only a failed fetch is returned as an error. Extraction failures are
    /// recorded in the corresponding field and download failures on each
    /// outcome.
    pub async fn scrape(&self, target: &PageTarget) -> Result<PageResult, FetchError> {
        ::log::info!("Scraping {} into {}", target, target.slug());

        let extract = self.fetch_and_extract(target).await?;
        if let Err(e) = &extract.sections {
            ::log::warn!("Structured record unavailable for {}: {}", target, e);
        }
        if let Err(e) = &extract.family {
            ::log::warn!("Family unavailable for {}: {}", target, e);
        }

        let PageExtract {
            sections,
            description,
            family,
            assets,
        } = extract;

        let destination = self.config.page_dir(target.slug());
        let downloads = self.downloader.download_all(assets, &destination).await;

        let result = PageResult {
            url: target.url().clone(),
            slug: target.slug().to_string(),
            sections,
            description,
            family,
            downloads,
        };

        ::log::info!(
            "Finished {}: {} images downloaded, {} failed",
            target,
            result.successful_downloads(),
            result.failed_downloads()
        );
        Ok(result)
    }

    /// The parsed document never outlives this call
    async fn fetch_and_extract(&self, target: &PageTarget) -> Result<PageExtract, FetchError> {
        let document = self.fetcher.fetch(target.url()).await?;
        Ok(parsers::extract_all(
            &document,
            &self.layout,
            &self.config.section_ids,
            target.url(),
        ))
    }
}
