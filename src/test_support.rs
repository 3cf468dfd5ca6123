use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use crate::transport::{Transport, TransportError, TransportResponse};

/// Counters shared between a [`MockTransport`] and the test that owns it
#[derive(Debug, Default)]
pub struct TransferStats {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: AtomicUsize,
}

impl TransferStats {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Held for the lifetime of one transfer
struct InFlight(Arc<TransferStats>);

impl InFlight {
    fn enter(stats: &Arc<TransferStats>) -> Self {
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        stats.requests.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(stats))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

enum Route {
    Body(u16, Vec<u8>),
    Fail(String),
    /// Sends the first chunk, then the body stream errors
    Truncated(u16, Vec<u8>, String),
}

/// In-memory transport keyed by absolute URL. Unknown URLs answer 404.
pub struct MockTransport {
    routes: HashMap<String, Route>,
    delay: Duration,
    stats: Arc<TransferStats>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            delay: Duration::ZERO,
            stats: Arc::new(TransferStats::default()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .insert(url.to_string(), Route::Body(status, body.into()));
        self
    }

    pub fn fail(mut self, url: &str, reason: &str) -> Self {
        self.routes
            .insert(url.to_string(), Route::Fail(reason.to_string()));
        self
    }

    pub fn truncate(mut self, url: &str, status: u16, partial: impl Into<Vec<u8>>, reason: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Truncated(status, partial.into(), reason.to_string()),
        );
        self
    }

    pub fn stats(&self) -> Arc<TransferStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let guard = InFlight::enter(&self.stats);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let (status, chunks) = match self.routes.get(url.as_str()) {
            Some(Route::Body(status, data)) => (*status, vec![Ok(Bytes::from(data.clone()))]),
            Some(Route::Fail(reason)) => return Err(TransportError::Other(reason.clone())),
            Some(Route::Truncated(status, partial, reason)) => (
                *status,
                vec![
                    Ok(Bytes::from(partial.clone())),
                    Err(TransportError::Other(reason.clone())),
                ],
            ),
            None => (404, vec![Ok(Bytes::from_static(b"not found"))]),
        };

        // The guard lives until the body has been handed over
        let body = futures::stream::once(async move {
            let _guard = guard;
            futures::stream::iter(chunks)
        })
        .flatten()
        .boxed();

        Ok(TransportResponse { status, body })
    }
}
