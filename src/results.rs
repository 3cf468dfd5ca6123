use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

use crate::error::ExtractionError;

/// Label/value pairs of one tab section, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    /// Section identifier (e.g. `tab1`)
    pub id: String,

    /// Trimmed labels (trailing colon removed) mapped to trimmed values
    pub fields: IndexMap<String, String>,
}

impl SectionRecord {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }
}

/// Taxonomic family of the item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyInfo {
    pub name: String,

    /// Target of the anchor inside the value node, if any
    pub link: Option<String>,
}

/// Image referenced by the carousel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    #[serde(serialize_with = "serialize_url")]
    pub source_url: Url,
}

impl ImageAsset {
    pub fn new(source_url: Url) -> Self {
        Self { source_url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Success {
        bytes: u64,
    },
    /// Non-2xx status, or the request/body transfer failed
    HttpFailure {
        http_status: Option<u16>,
        reason: String,
    },
    /// Directory, file or name problem on the local side
    IoFailure {
        reason: String,
    },
}

/// Result of downloading one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub asset: ImageAsset,
    pub destination_path: PathBuf,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DownloadStatus::Success { .. })
    }
}

/// Everything harvested from one page
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    #[serde(serialize_with = "serialize_url")]
    pub url: Url,

    pub slug: String,

    /// Either every configured section, in order, or the first failure
    pub sections: Result<Vec<SectionRecord>, ExtractionError>,

    /// Normalized description text, empty when the page has none
    pub description: String,

    pub family: Result<FamilyInfo, ExtractionError>,

    pub downloads: Vec<DownloadOutcome>,
}

impl PageResult {
    pub fn successful_downloads(&self) -> usize {
        self.downloads.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed_downloads(&self) -> usize {
        self.downloads.len() - self.successful_downloads()
    }
}

fn serialize_url<S: serde::Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}
