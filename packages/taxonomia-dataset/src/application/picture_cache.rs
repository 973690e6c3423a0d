//! Picture cache refresh
//!
//! Fan-out: one task per distinct picture URL, every outcome sent to one
//! channel. Once all tasks have reported, successful downloads are written
//! in a single store transaction. A failed download is logged and skipped;
//! only a store failure fails the refresh.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::{DatasetStore, PictureFetcher};
use crate::error::Result;

/// Outcome of one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Distinct URLs requested
    pub requested: usize,
    pub cached: usize,
    pub failed: usize,
}

pub async fn refresh_picture_cache<S, F>(store: &S, fetcher: Arc<F>) -> Result<RefreshReport>
where
    S: DatasetStore + ?Sized,
    F: PictureFetcher + ?Sized + 'static,
{
    let urls: BTreeSet<String> = store.picture_sources().await?.into_iter().collect();
    let mut report = RefreshReport {
        requested: urls.len(),
        ..Default::default()
    };
    info!(pictures = report.requested, "Refreshing picture cache");

    let (tx, mut rx) = mpsc::unbounded_channel();
    for url in urls {
        let tx = tx.clone();
        let fetcher = Arc::clone(&fetcher);
        tokio::spawn(async move {
            let outcome = fetcher.fetch(&url).await;
            // The receiver lives until every sender is gone
            let _ = tx.send((url, outcome));
        });
    }
    drop(tx);

    let mut downloaded = Vec::new();
    while let Some((url, outcome)) = rx.recv().await {
        match outcome {
            Ok(data) => downloaded.push((url, data)),
            Err(err) => warn!(url = %url, error = %err, "Cannot download picture"),
        }
    }
    // Counts tasks that panicked before reporting as failures too
    report.failed = report.requested - downloaded.len();

    downloaded.sort_by(|a, b| a.0.cmp(&b.0));
    report.cached = store.store_cached_pictures(&downloaded).await?;
    info!(
        cached = report.cached,
        failed = report.failed,
        "Picture cache refreshed"
    );
    Ok(report)
}
