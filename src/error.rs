use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure to obtain a page document. Fatal to the whole page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page URL \"{url}\" has no non-empty path segment to use as a slug")]
    NoSlug { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed reading body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// URL of the page this error belongs to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::NoSlug { url }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. } => url,
        }
    }
}

/// The document does not have the shape a field extractor expects.
/// Fatal to that field only.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionError {
    #[error("no tab content found for section \"{section}\"")]
    MissingSection { section: String },

    #[error("no info list found in section \"{section}\"")]
    MissingInfoList { section: String },

    #[error("no label containing the family marker")]
    NoFamilyLabel,

    #[error("family label has no value node after it")]
    NoFamilyValue,
}

/// Setup errors: configuration, selectors, client construction, input files.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid selector for {field} (\"{selector}\"): {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failures while collecting page URLs from a listing
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid listing URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not connect to any WebDriver server (tried {tried})")]
    Connect { tried: String },

    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("invalid item selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
