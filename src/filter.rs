use regex::Regex;
use url::Url;

/// Rules for which discovered links count as item pages
#[derive(Debug, Clone, Default)]
pub struct LinkFilterConfig {
    /// Domain links must belong to (if None, any domain is accepted)
    pub required_domain: Option<String>,

    /// Path prefix links must start with (if None, all paths are accepted)
    pub required_path_prefix: Option<String>,

    /// Regex patterns for links to drop
    pub exclude_patterns: Vec<String>,
}

impl LinkFilterConfig {
    /// Keeps links on the listing's own domain and below its path
    pub fn scoped_to(listing_url: &Url, exclude_patterns: Vec<String>) -> Self {
        Self {
            required_domain: listing_url.domain().map(|d| d.to_string()),
            required_path_prefix: Some(listing_url.path().to_string()),
            exclude_patterns,
        }
    }
}

/// Link filter built from a [`LinkFilterConfig`]
#[derive(Debug)]
pub struct LinkFilter {
    config: LinkFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Determine if a link should be kept based on all filtering rules
    pub fn should_keep(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if let Some(required_domain) = &self.config.required_domain {
            if url.domain() != Some(required_domain.as_str()) {
                return false;
            }
        }

        if let Some(prefix) = &self.config.required_path_prefix {
            if !url.path().starts_with(prefix.as_str()) {
                return false;
            }
        }

        let url_str = url.as_str();
        !self.exclude_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// Create a normalized version of the URL (fragment removed)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
