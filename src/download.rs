use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use url::Url;

use crate::results::{DownloadOutcome, DownloadStatus, ImageAsset};
use crate::transport::{BodyStream, Transport};
use crate::utils::final_segment;

/// Streams image assets into a directory with a fixed-size worker pool
#[derive(Clone)]
pub struct AssetDownloader {
    transport: Arc<dyn Transport>,
    max_concurrency: usize,
}

impl AssetDownloader {
    pub fn new(transport: Arc<dyn Transport>, max_concurrency: usize) -> Self {
        Self {
            transport,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Downloads every asset into `destination_dir`.
    ///
    /// Returns exactly one outcome per asset, in completion order. Failures
    /// are recorded on the outcome and never stop the other transfers.
    pub async fn download_all(
        &self,
        assets: Vec<ImageAsset>,
        destination_dir: &Path,
    ) -> Vec<DownloadOutcome> {
        if let Err(e) = tokio::fs::create_dir_all(destination_dir).await {
            ::log::error!(
                "Failed to create directory {}: {}",
                destination_dir.display(),
                e
            );
            let reason = format!("failed to create {}: {}", destination_dir.display(), e);
            return assets
                .into_iter()
                .map(|asset| DownloadOutcome {
                    destination_path: destination_path(&asset.source_url, destination_dir),
                    asset,
                    status: DownloadStatus::IoFailure {
                        reason: reason.clone(),
                    },
                })
                .collect();
        }

        let total = assets.len();
        if total == 0 {
            return Vec::new();
        }

        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<ImageAsset>();
        for asset in assets {
            // The receiver is alive until the workers finish
            let _ = queue_tx.send(asset);
        }
        drop(queue_tx);

        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<DownloadOutcome>(total);
        let destination_dir: Arc<Path> = Arc::from(destination_dir);

        let num_workers = self.max_concurrency.min(total);
        ::log::debug!(
            "Downloading {} assets into {} with {} workers",
            total,
            destination_dir.display(),
            num_workers
        );

        let handles: Vec<JoinHandle<()>> = (0..num_workers)
            .map(|worker_id| {
                spawn_worker(
                    worker_id,
                    Arc::clone(&self.transport),
                    Arc::clone(&destination_dir),
                    Arc::clone(&queue_rx),
                    result_tx.clone(),
                )
            })
            .collect();

        // Each worker owns a sender; the channel closes when they are all done
        drop(result_tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = result_rx.recv().await {
            outcomes.push(outcome);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                ::log::error!("Download worker terminated abnormally: {}", e);
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        ::log::info!(
            "Downloaded {} of {} assets into {}",
            succeeded,
            total,
            destination_dir.display()
        );

        outcomes
    }
}

fn spawn_worker(
    worker_id: usize,
    transport: Arc<dyn Transport>,
    destination_dir: Arc<Path>,
    queue_rx: Arc<Mutex<mpsc::UnboundedReceiver<ImageAsset>>>,
    result_tx: mpsc::Sender<DownloadOutcome>,
) -> JoinHandle<()> {
    ::log::trace!("Spawning download worker {}", worker_id);

    tokio::spawn(async move {
        while let Some(asset) = next_asset(&queue_rx).await {
            let outcome = download_one(transport.as_ref(), asset, &destination_dir).await;
            if result_tx.send(outcome).await.is_err() {
                ::log::error!("Download worker {} lost its result channel", worker_id);
                break;
            }
        }
        ::log::trace!("Download worker {} finished", worker_id);
    })
}

async fn next_asset(queue_rx: &Mutex<mpsc::UnboundedReceiver<ImageAsset>>) -> Option<ImageAsset> {
    queue_rx.lock().await.recv().await
}

/// `<dir>/<final path segment>`, or the directory itself when the URL has none
fn destination_path(url: &Url, dir: &Path) -> PathBuf {
    match final_segment(url) {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}

async fn download_one(
    transport: &dyn Transport,
    asset: ImageAsset,
    destination_dir: &Path,
) -> DownloadOutcome {
    let destination_path = destination_path(&asset.source_url, destination_dir);

    let status = if final_segment(&asset.source_url).is_none() {
        DownloadStatus::IoFailure {
            reason: "asset URL has no file name".to_string(),
        }
    } else {
        match transfer(transport, &asset.source_url, &destination_path).await {
            Ok(bytes) => DownloadStatus::Success { bytes },
            Err(TransferError::Http { status, reason }) => DownloadStatus::HttpFailure {
                http_status: status,
                reason,
            },
            Err(TransferError::Io(e)) => DownloadStatus::IoFailure {
                reason: e.to_string(),
            },
        }
    };

    match &status {
        DownloadStatus::Success { bytes } => ::log::debug!(
            "Downloaded {} ({} bytes) to {}",
            asset.source_url,
            bytes,
            destination_path.display()
        ),
        DownloadStatus::HttpFailure { reason, .. } | DownloadStatus::IoFailure { reason } => {
            ::log::warn!("Failed to download {}: {}", asset.source_url, reason)
        }
    }

    DownloadOutcome {
        asset,
        destination_path,
        status,
    }
}

enum TransferError {
    Http { status: Option<u16>, reason: String },
    Io(std::io::Error),
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e)
    }
}

/// Streams one asset to disk, overwriting any existing file
async fn transfer(transport: &dyn Transport, url: &Url, path: &Path) -> Result<u64, TransferError> {
    let response = transport
        .get(url)
        .await
        .map_err(|e| TransferError::Http {
            status: None,
            reason: e.to_string(),
        })?;

    let status = response.status;
    if !response.is_success() {
        return Err(TransferError::Http {
            status: Some(status),
            reason: format!("unexpected HTTP status {status}"),
        });
    }

    // The final name only ever holds a complete body
    let partial = partial_path(path);
    let result = match write_body(response.body, status, &partial).await {
        Ok(written) => tokio::fs::rename(&partial, path)
            .await
            .map(|()| written)
            .map_err(TransferError::from),
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            ::log::debug!("Could not remove {}: {}", partial.display(), e);
        }
    }
    result
}

async fn write_body(mut body: BodyStream, status: u16, path: &Path) -> Result<u64, TransferError> {
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| TransferError::Http {
            status: Some(status),
            reason: format!("body transfer failed: {e}"),
        })?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

/// Unique `<name>.<n>.part` sibling, so assets sharing a file name never
/// write into the same temporary file
fn partial_path(path: &Path) -> PathBuf {
    static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(format!(".{}.part", SEQUENCE.fetch_add(1, Ordering::Relaxed)));
    path.with_file_name(name)
}
