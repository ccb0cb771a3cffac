//! Durable pothole record store.
//!
//! This crate provides:
//! - Append-ordered persistence of accepted reports (JSON store file)
//! - Image persistence keyed by record identifier
//! - Serialized mutation with concurrent reads
//! - Bulk clearing with per-image failure reporting

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{ClearOutcome, RecordStore, IMAGE_URL_PREFIX};
