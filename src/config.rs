use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::HarvestError;

/// Top-level configuration threaded through the scraper and the batch driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Number of download workers per page
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Number of pages processed at once by the batch driver
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,

    /// Root under which one directory per page slug is created
    #[serde(default = "default_destination_root")]
    pub destination_root: PathBuf,

    /// Ordered section identifiers extracted from every page
    #[serde(default = "default_section_ids")]
    pub section_ids: Vec<String>,

    /// Per-request timeout enforced by the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Markup structure of the catalog site
    #[serde(default)]
    pub layout: SiteLayout,

    /// Listing page discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// CSS selectors and markers describing where data lives on an item page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLayout {
    /// Element type of the section containers; matched by `id`
    #[serde(default = "default_section_container")]
    pub section_container: String,

    /// Label/value list inside a section
    #[serde(default = "default_info_list")]
    pub info_list: String,

    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default = "default_value")]
    pub value: String,

    /// Free-text description container
    #[serde(default = "default_description")]
    pub description: String,

    /// Carousel slide container
    #[serde(default = "default_slide")]
    pub slide: String,

    /// Image element inside a slide
    #[serde(default = "default_slide_image")]
    pub slide_image: String,

    /// Lazy-load attribute holding the image reference
    #[serde(default = "default_lazy_src_attr")]
    pub lazy_src_attr: String,

    /// Literal text marking the classification label
    #[serde(default = "default_family_marker")]
    pub family_marker: String,
}

/// Configuration for the browser-driven listing discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Anchors pointing at item pages on the listing
    #[serde(default = "default_item_selector")]
    pub item_selector: String,

    /// Wait after navigation before the first scroll
    #[serde(default = "default_initial_wait_secs")]
    pub initial_wait_secs: u64,

    /// Wait after each scroll for new content to load
    #[serde(default = "default_scroll_pause_secs")]
    pub scroll_pause_secs: u64,

    /// Upper bound on scroll iterations
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Regex patterns for discovered URLs to drop
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarvestError> {
        let path = path.as_ref();
        let io_err = |source| HarvestError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::open(path).map_err(io_err)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_err)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, HarvestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Download directory for one page
    pub fn page_dir(&self, slug: &str) -> PathBuf {
        self.destination_root.join(slug)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            page_concurrency: default_page_concurrency(),
            destination_root: default_destination_root(),
            section_ids: default_section_ids(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            layout: SiteLayout::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            section_container: default_section_container(),
            info_list: default_info_list(),
            label: default_label(),
            value: default_value(),
            description: default_description(),
            slide: default_slide(),
            slide_image: default_slide_image(),
            lazy_src_attr: default_lazy_src_attr(),
            family_marker: default_family_marker(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            item_selector: default_item_selector(),
            initial_wait_secs: default_initial_wait_secs(),
            scroll_pause_secs: default_scroll_pause_secs(),
            max_scrolls: default_max_scrolls(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_max_concurrency() -> usize {
    4
}

fn default_page_concurrency() -> usize {
    4
}

fn default_destination_root() -> PathBuf {
    PathBuf::from("data/plant_images")
}

fn default_section_ids() -> Vec<String> {
    (1..=5).map(|i| format!("tab{i}")).collect()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("flora-harvest/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_section_container() -> String {
    "div".to_string()
}

fn default_info_list() -> String {
    "dl.info".to_string()
}

fn default_label() -> String {
    "dt".to_string()
}

fn default_value() -> String {
    "dd".to_string()
}

fn default_description() -> String {
    "div.description".to_string()
}

fn default_slide() -> String {
    "div.slide".to_string()
}

fn default_slide_image() -> String {
    "img".to_string()
}

fn default_lazy_src_attr() -> String {
    "data-src".to_string()
}

fn default_family_marker() -> String {
    "Family:".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_item_selector() -> String {
    "div.item > a".to_string()
}

fn default_initial_wait_secs() -> u64 {
    5
}

fn default_scroll_pause_secs() -> u64 {
    10
}

fn default_max_scrolls() -> usize {
    200
}
