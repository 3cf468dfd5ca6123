use fantoccini::{Client, ClientBuilder};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::filter::{LinkFilter, LinkFilterConfig};

/// Collects item page URLs from an infinitely scrolling listing page.
///
/// Drives a WebDriver browser: loads the listing, scrolls to the bottom
/// until the document height stops growing, then reads the item anchors out
/// of the final page source.
pub struct ListingDiscovery {
    config: DiscoveryConfig,
    listing_url: Url,
    item_selector: Selector,
    filter: LinkFilter,
}

impl ListingDiscovery {
    pub fn new(config: DiscoveryConfig, listing_url: &str) -> Result<Self, DiscoveryError> {
        let listing_url = Url::parse(listing_url).map_err(|source| DiscoveryError::InvalidUrl {
            url: listing_url.to_string(),
            source,
        })?;

        let item_selector =
            Selector::parse(&config.item_selector).map_err(|e| DiscoveryError::Selector {
                selector: config.item_selector.clone(),
                reason: e.to_string(),
            })?;

        let filter = LinkFilter::new(LinkFilterConfig::scoped_to(
            &listing_url,
            config.exclude_patterns.clone(),
        ))?;

        Ok(Self {
            config,
            listing_url,
            item_selector,
            filter,
        })
    }

    /// Runs a browser session against the listing and returns the item URLs
    pub async fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        ::log::info!("Discovering item pages on {}", self.listing_url);

        let client = connect_to_webdriver(&self.config.webdriver_url).await?;
        let result = self.collect(&client).await;

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        let urls = result?;
        ::log::info!("Found {} item pages on {}", urls.len(), self.listing_url);
        Ok(urls)
    }

    async fn collect(&self, client: &Client) -> Result<Vec<String>, DiscoveryError> {
        client.goto(self.listing_url.as_str()).await?;

        // Let the first batch of dynamic content render
        tokio::time::sleep(Duration::from_secs(self.config.initial_wait_secs)).await;

        let scrolls = scroll_to_end(
            client,
            Duration::from_secs(self.config.scroll_pause_secs),
            self.config.max_scrolls,
        )
        .await?;
        ::log::debug!("Listing stopped growing after {} scrolls", scrolls);

        let source = client.source().await?;
        Ok(self.item_links(&source))
    }

    /// Item URLs in the listing markup, resolved, filtered and de-duplicated
    /// in document order
    pub fn item_links(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();

        doc.select(&self.item_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.listing_url.join(href).ok())
            .filter(|url| self.filter.should_keep(url))
            .map(|url| self.filter.normalize_url(&url))
            .filter(|url| *url != self.listing_url)
            .map(|url| url.to_string())
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}

/// Connects to the WebDriver instance, trying common local ports if the
/// configured one does not answer
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, DiscoveryError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // geckodriver / Selenium default
        "http://127.0.0.1:4444",
    ];

    let mut tried = vec![webdriver_url.to_string()];
    for url in fallback_urls.iter().filter(|u| **u != webdriver_url) {
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        tried.push(url.to_string());
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(DiscoveryError::Connect {
        tried: tried.join(", "),
    })
}

/// Scrolls to the bottom until the body height is unchanged after a pause.
/// Returns the number of scrolls performed.
async fn scroll_to_end(
    client: &Client,
    pause: Duration,
    max_scrolls: usize,
) -> Result<usize, DiscoveryError> {
    let mut last_height = page_height(client).await?;

    for scroll in 1..=max_scrolls {
        client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        tokio::time::sleep(pause).await;

        let new_height = page_height(client).await?;
        ::log::trace!("Scroll {}: height {} -> {}", scroll, last_height, new_height);
        if new_height == last_height {
            return Ok(scroll);
        }
        last_height = new_height;
    }

    ::log::warn!("Listing still growing after {} scrolls, stopping", max_scrolls);
    Ok(max_scrolls)
}

async fn page_height(client: &Client) -> Result<u64, DiscoveryError> {
    let value = client
        .execute("return document.body.scrollHeight;", vec![])
        .await?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().map(|h| h as u64))
        .unwrap_or(0))
}

/// Writes one URL per line
pub fn write_url_file(path: &Path, urls: &[String]) -> Result<(), DiscoveryError> {
    let mut contents = urls.join("\n");
    contents.push('\n');
    std::fs::write(path, contents).map_err(|source| DiscoveryError::Io {
        path: path.display().to_string(),
        source,
    })
}
