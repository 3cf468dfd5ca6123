use std::fmt;
use url::Url;

use crate::error::FetchError;
use crate::utils::last_nonempty_segment;

/// One item page to harvest, with its destination slug derived up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    url: Url,
    slug: String,
}

impl PageTarget {
    /// Parses a page URL and derives its slug.
    ///
    /// The slug is the last non-empty path segment
    /// (`https://flora.org.il/en/plants/pteaqu/` gives `pteaqu`). A URL that
    /// does not parse or has no such segment is rejected here, before any
    /// request is made.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(parsed)
    }

    pub fn from_url(url: Url) -> Result<Self, FetchError> {
        let slug = last_nonempty_segment(&url)
            .map(str::to_string)
            .ok_or_else(|| FetchError::NoSlug {
                url: url.to_string(),
            })?;
        Ok(Self { url, slug })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}
