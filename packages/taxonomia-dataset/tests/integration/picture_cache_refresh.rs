//! Picture cache refresh against an on-disk store

#[path = "../common/mod.rs"]
mod common;

use async_trait::async_trait;
use common::flora_dataset;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use taxonomia_dataset::application::{refresh_picture_cache, RefreshReport};
use taxonomia_dataset::{DatasetError, DatasetStore, PictureFetcher, Result, SqliteDatasetStore};
use tempfile::TempDir;

/// Serves the URL bytes back, fails URLs listed in `broken`
#[derive(Default)]
struct RecordingFetcher {
    calls: AtomicUsize,
    broken: Vec<String>,
}

#[async_trait]
impl PictureFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.iter().any(|b| b == url) {
            return Err(DatasetError::fetch(url, "status 500"));
        }
        Ok(url.as_bytes().to_vec())
    }
}

#[tokio::test]
async fn test_each_distinct_url_is_fetched_once() {
    taxonomia_dataset::logging::init_test_logging();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    let fetcher = Arc::new(RecordingFetcher::default());
    let report = refresh_picture_cache(&store, Arc::clone(&fetcher)).await.unwrap();

    // ovate.jpg is shared by s1 and s6
    assert_eq!(
        report,
        RefreshReport {
            requested: 3,
            cached: 3,
            failed: 0,
        }
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    assert_eq!(store.stats().await.unwrap().cached_pictures, 3);
}

#[tokio::test]
async fn test_cache_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    {
        let store = SqliteDatasetStore::new(&db).unwrap();
        store.load_dataset(&flora_dataset()).await.unwrap();
        refresh_picture_cache(&store, Arc::new(RecordingFetcher::default()))
            .await
            .unwrap();
    }

    let reopened = SqliteDatasetStore::new(&db).unwrap();
    assert_eq!(
        reopened
            .cached_picture("http://pics.example/leaf.jpg")
            .await
            .unwrap(),
        Some(b"http://pics.example/leaf.jpg".to_vec())
    );
}

#[tokio::test]
async fn test_failed_downloads_are_reported_not_stored() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    let fetcher = Arc::new(RecordingFetcher {
        broken: vec!["http://pics.example/ovate-2.jpg".to_string()],
        ..Default::default()
    });
    let report = refresh_picture_cache(&store, fetcher).await.unwrap();

    assert_eq!(report.cached, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(
        store
            .cached_picture("http://pics.example/ovate-2.jpg")
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_refresh_twice_replaces_entries() {
    let store = SqliteDatasetStore::in_memory().unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    refresh_picture_cache(&store, Arc::new(RecordingFetcher::default()))
        .await
        .unwrap();
    let report = refresh_picture_cache(&store, Arc::new(RecordingFetcher::default()))
        .await
        .unwrap();

    assert_eq!(report.cached, 3);
    assert_eq!(store.stats().await.unwrap().cached_pictures, 3);
}
