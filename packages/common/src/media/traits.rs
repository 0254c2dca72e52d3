use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// Metadata returned by the media store for a stored image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    /// Stored size in bytes.
    pub bytes: u64,
}

/// Result of deleting a single asset.
///
/// The store treats a missing asset as a successful delete, so `success`
/// is `true` both for "deleted" and "was already gone".
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub success: bool,
    /// Raw result string from the store (`ok`, `not found`, ...).
    pub result: String,
}

/// Result of a bulk delete.
///
/// Successful deletions are never rolled back; `partial` flags that some of
/// the requested ids were not removed.
#[derive(Debug, Clone, Default)]
pub struct BulkDeleteOutcome {
    /// Per-id result string as reported by the store.
    pub deleted: HashMap<String, String>,
    pub partial: bool,
}

/// Remote image hosting behind a small capability set.
///
/// Every mutating call is a network round-trip; no caching or retries happen
/// here. A failed call surfaces immediately to the caller.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload raw image bytes, applying the store's fixed transformation.
    ///
    /// The asset is stored under a deterministic folder with a name derived
    /// from a timestamp and `filename`.
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<UploadedImage, MediaError>;

    /// Re-host an externally referenced image.
    ///
    /// Callers are responsible for checking [`MediaStore::owns_url`] first;
    /// this method always performs the remote call.
    async fn upload_from_url(
        &self,
        url: &str,
        public_id: Option<String>,
    ) -> Result<UploadedImage, MediaError>;

    /// Idempotent single-asset removal.
    async fn delete_one(&self, public_id: &str) -> Result<DeleteOutcome, MediaError>;

    /// Bulk removal in one call. Partial failure is reported, not rolled back.
    async fn delete_many(&self, public_ids: &[String]) -> Result<BulkDeleteOutcome, MediaError>;

    /// Whether `url` already points at this store (substring match on the
    /// store's delivery domain).
    fn owns_url(&self, url: &str) -> bool;

    /// Build a derived delivery URL for an already-stored asset.
    fn transform_url(&self, public_id: &str, width: u32, height: u32) -> String;
}
