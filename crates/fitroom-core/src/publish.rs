//! Seam to the caller's storage layer.
//!
//! Persisting uploads and serving them over HTTP is the caller's job;
//! this crate only needs "store these bytes, give me a URL the remote
//! provider can fetch". Implementations typically write into the
//! service's uploads directory and return `<public_base_url>/files/<name>`.

use crate::error::Result;
use crate::types::ImageBlob;
use async_trait::async_trait;

/// Stores a blob somewhere publicly fetchable and returns its URL.
///
/// `async_trait` because the orchestrator holds it as a trait object.
#[async_trait]
pub trait BlobPublisher: Send + Sync {
    async fn publish(&self, blob: &ImageBlob) -> Result<String>;
}
