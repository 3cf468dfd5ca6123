use std::sync::Arc;
use url::Url;

use crate::error::FetchError;
use crate::parsers::Document;
use crate::transport::Transport;

/// Fetches page markup and parses it into a [`Document`]
#[derive(Clone)]
pub struct DocumentFetcher {
    transport: Arc<dyn Transport>,
}

impl DocumentFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// One GET, no retry. Anything other than a 2xx status is an error.
    pub async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let markup = self.fetch_markup(url).await?;
        Ok(Document::parse(&markup))
    }

    /// Body of the page as text, decoded lossily
    pub async fn fetch_markup(&self, url: &Url) -> Result<String, FetchError> {
        ::log::debug!("GET {}", url);

        let response = self
            .transport
            .get(url)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let body = response
            .collect_body()
            .await
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

        ::log::trace!("Fetched {} bytes from {}", body.len(), url);
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
