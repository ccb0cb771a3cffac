//! File-backed record store.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use rwatch_models::PotholeRecord;

use crate::error::{StorageError, StorageResult};

/// Store file name under the data directory.
const STORE_FILE: &str = "potholes.json";

/// Image directory name under the data directory.
const IMAGES_DIR: &str = "images";

/// Public URL prefix under which images are served.
pub const IMAGE_URL_PREFIX: &str = "/images";

/// Result of a clear-all operation.
///
/// Image deletion failures are collected here instead of aborting the
/// operation; the record list is truncated regardless.
#[derive(Debug, Default)]
pub struct ClearOutcome {
    /// Number of records removed from the store
    pub records_removed: usize,
    /// Number of image files deleted
    pub images_deleted: usize,
    /// Per-file deletion failures
    pub failures: Vec<String>,
}

/// File-backed store of pothole records plus their images.
///
/// The durable representation is one JSON array (`potholes.json`) read in
/// full and rewritten in full on every mutation, plus one JPEG per record
/// under `images/`. Mutations serialize on the write half of an async
/// `RwLock` held across the whole read-modify-write sequence; reads share
/// the read half. The store file is rewritten via temp file + rename so a
/// concurrent reader never observes a torn file.
pub struct RecordStore {
    store_path: PathBuf,
    images_dir: PathBuf,
    lock: RwLock<()>,
}

impl RecordStore {
    /// Open (and initialize if needed) a store rooted at `data_dir`.
    pub async fn open(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let data_dir = data_dir.as_ref();
        let images_dir = data_dir.join(IMAGES_DIR);
        let store_path = data_dir.join(STORE_FILE);

        fs::create_dir_all(&images_dir)
            .await
            .map_err(|source| StorageError::Init {
                path: images_dir.clone(),
                source,
            })?;

        if !fs::try_exists(&store_path).await.unwrap_or(false) {
            write_store_file(&store_path, &[]).await?;
        }

        info!(store = %store_path.display(), "Record store opened");

        Ok(Self {
            store_path,
            images_dir,
            lock: RwLock::new(()),
        })
    }

    /// Directory holding persisted images, for static serving.
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Ingest one report: persist its image and append a record.
    ///
    /// The image is written first, then the record list is read in full,
    /// appended, and rewritten before returning; a failure at any step
    /// surfaces as an error and never leaves a record without its image.
    pub async fn ingest(
        &self,
        latitude: f64,
        longitude: f64,
        severity: &str,
        image: &[u8],
    ) -> StorageResult<PotholeRecord> {
        let _guard = self.lock.write().await;

        let record = PotholeRecord::create(latitude, longitude, severity, IMAGE_URL_PREFIX);
        let image_path = self.images_dir.join(record.image_filename());

        fs::write(&image_path, image)
            .await
            .map_err(|source| StorageError::ImageWrite {
                path: image_path.clone(),
                source,
            })?;

        let mut records = read_store_file(&self.store_path).await?;
        records.push(record.clone());

        if let Err(e) = write_store_file(&self.store_path, &records).await {
            // Keep store and image directory consistent: the record was
            // never persisted, so its image must not linger.
            if let Err(cleanup) = fs::remove_file(&image_path).await {
                warn!(
                    image = %image_path.display(),
                    error = %cleanup,
                    "Failed to remove image after store write failure"
                );
            }
            return Err(e);
        }

        info!(
            id = %record.id,
            latitude,
            longitude,
            severity,
            "Pothole record ingested"
        );

        Ok(record)
    }

    /// All records in insertion order.
    pub async fn list_all(&self) -> StorageResult<Vec<PotholeRecord>> {
        let _guard = self.lock.read().await;
        read_store_file(&self.store_path).await
    }

    /// Truncate the store and delete every persisted image.
    ///
    /// Truncation happens first and always; individual image deletion
    /// failures are collected into the outcome rather than aborting.
    pub async fn clear_all(&self) -> StorageResult<ClearOutcome> {
        let _guard = self.lock.write().await;

        let records = read_store_file(&self.store_path).await.unwrap_or_default();
        write_store_file(&self.store_path, &[]).await?;

        let mut outcome = ClearOutcome {
            records_removed: records.len(),
            ..ClearOutcome::default()
        };

        let mut entries = match fs::read_dir(&self.images_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                outcome
                    .failures
                    .push(format!("{}: {e}", self.images_dir.display()));
                return Ok(outcome);
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => outcome.images_deleted += 1,
                Err(e) => {
                    warn!(image = %path.display(), error = %e, "Failed to delete image");
                    outcome.failures.push(format!("{}: {e}", path.display()));
                }
            }
        }

        info!(
            records = outcome.records_removed,
            images = outcome.images_deleted,
            failures = outcome.failures.len(),
            "Store cleared"
        );

        Ok(outcome)
    }
}

/// Read the full record list from the store file.
async fn read_store_file(path: &Path) -> StorageResult<Vec<PotholeRecord>> {
    let bytes = fs::read(path).await.map_err(|source| StorageError::StoreRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Rewrite the full record list, atomically via temp file + rename.
async fn write_store_file(path: &Path, records: &[PotholeRecord]) -> StorageResult<()> {
    let json = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, &json)
        .await
        .map_err(|source| StorageError::StoreWrite {
            path: tmp.clone(),
            source,
        })?;

    fs::rename(&tmp, path)
        .await
        .map_err(|source| StorageError::StoreWrite {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const JPEG_STUB: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

    async fn open_temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_initializes_empty_store() {
        let (_dir, store) = open_temp_store().await;
        let records = store.list_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_round_trip() {
        let (_dir, store) = open_temp_store().await;

        let record = store
            .ingest(40.7128, -74.0060, "High", JPEG_STUB)
            .await
            .unwrap();

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], record);
        assert_eq!(listed[0].latitude, 40.7128);
        assert_eq!(listed[0].longitude, -74.0060);
        assert_eq!(listed[0].severity, "High");
        assert_eq!(listed[0].image_url, format!("/images/{}.jpg", record.id));

        // Image reference resolves to an existing file with the exact bytes
        let image_path = store.images_dir().join(record.image_filename());
        assert_eq!(std::fs::read(image_path).unwrap(), JPEG_STUB);
    }

    #[tokio::test]
    async fn test_ingest_ids_distinct_and_ordered() {
        let (_dir, store) = open_temp_store().await;

        let mut ids = Vec::new();
        for i in 0..5 {
            let record = store
                .ingest(10.0 + i as f64, 20.0, "Low", JPEG_STUB)
                .await
                .unwrap();
            ids.push(record.id);
        }

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 5);
        // Insertion order preserved
        let listed_ids: Vec<_> = listed.iter().map(|r| r.id.clone()).collect();
        assert_eq!(listed_ids, ids);
        // Pairwise distinct
        assert_eq!(listed_ids.iter().collect::<HashSet<_>>().len(), 5);
    }

    #[tokio::test]
    async fn test_clear_all_removes_records_and_images() {
        let (_dir, store) = open_temp_store().await;

        for _ in 0..3 {
            store.ingest(1.0, 2.0, "Medium", JPEG_STUB).await.unwrap();
        }

        let outcome = store.clear_all().await.unwrap();
        assert_eq!(outcome.records_removed, 3);
        assert_eq!(outcome.images_deleted, 3);
        assert!(outcome.failures.is_empty());

        assert!(store.list_all().await.unwrap().is_empty());
        let remaining: Vec<_> = std::fs::read_dir(store.images_dir()).unwrap().collect();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_on_empty_store() {
        let (_dir, store) = open_temp_store().await;
        let outcome = store.clear_all().await.unwrap();
        assert_eq!(outcome.records_removed, 0);
        assert_eq!(outcome.images_deleted, 0);
    }

    #[tokio::test]
    async fn test_corrupted_store_file_is_reported() {
        let (dir, store) = open_temp_store().await;
        std::fs::write(dir.path().join("potholes.json"), b"{not json").unwrap();

        match store.list_all().await {
            Err(StorageError::Corrupted(_)) => {}
            other => panic!("expected Corrupted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_ingest_loses_no_updates() {
        let (_dir, store) = open_temp_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .ingest(i as f64, -(i as f64), "Low", JPEG_STUB)
                    .await
                    .unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let record = handle.await.unwrap();
            ids.insert(record.id);
        }

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 16);
        assert_eq!(ids.len(), 16);
        // Every ingested record made it to the durable list
        let listed_ids: HashSet<_> = listed.into_iter().map(|r| r.id).collect();
        assert_eq!(listed_ids, ids);
    }
}
