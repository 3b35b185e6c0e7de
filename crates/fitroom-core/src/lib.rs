//! fitroom-core - Try-on and tagging orchestration library.
//!
//! The hard part of a closet/try-on service is not its storage but the
//! choreography around two unreliable external AI services: an
//! asynchronous image-synthesis ("virtual try-on") job API and a
//! vision-language tagging API. This crate owns that choreography:
//!
//! ```text
//! ImageBlob → shrink → choose reference (public URL | inline data)
//!           → tag (chat completion)          → TagResult
//!           → try-on (submit + poll | mock)  → ImageBlob
//! ```
//!
//! HTTP routing, persistence and file serving stay with the caller; it
//! hands raw bytes in and persists whatever comes back.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fitroom_core::{Config, Fitroom};
//!
//! #[tokio::main]
//! async fn main() -> fitroom_core::Result<()> {
//!     let fitroom = Fitroom::new(Config::from_env()?);
//!     let tags = fitroom.tag(&blob).await?;
//!     println!("category: {:?}", tags.category);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod imaging;
pub mod publish;
pub mod reachability;
pub mod retry;
pub mod synthesis;
pub mod types;
pub mod vision;

// Re-exports for convenient access
pub use config::{Config, Provider};
pub use error::{FitroomError, Result};
pub use imaging::MockCompositor;
pub use publish::BlobPublisher;
pub use synthesis::SynthesisJobClient;
pub use types::{ImageBlob, ImageReference, JobStatus, SynthesisJob, TagResult};
pub use vision::VisionTaggingClient;

use imaging::{shrink, TAGGING_JPEG_QUALITY, TRANSPORT_MAX_SIDE, TRYON_JPEG_QUALITY};
use reachability::is_publicly_routable;
use serde_json::Value;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level orchestrator - the main entry point.
///
/// Owns one client per remote surface and the fallback policy between
/// reference strategies. All state is the immutable [`Config`] snapshot
/// plus stateless HTTP clients, so one instance is freely shared across
/// concurrent requests.
pub struct Fitroom {
    config: Config,
    vision: VisionTaggingClient,
    synthesis: SynthesisJobClient,
    publisher: Option<Box<dyn BlobPublisher>>,
}

impl Fitroom {
    /// Create an orchestrator without a blob publisher: tagging always
    /// uses the inline-data strategy and remote try-on is unavailable.
    pub fn new(config: Config) -> Self {
        let vision = VisionTaggingClient::new(&config);
        let synthesis = SynthesisJobClient::new(&config);
        Self {
            config,
            vision,
            synthesis,
            publisher: None,
        }
    }

    /// Wire in the caller's storage layer so blobs can be referenced by
    /// public URL.
    pub fn with_publisher(mut self, publisher: Box<dyn BlobPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tag an image, preferring the public-URL reference strategy.
    ///
    /// When the configured base URL is publicly routable (and a
    /// publisher is wired in), the blob is published and referenced by
    /// URL. Any failure on that path is swallowed with a warning and
    /// the call retries once with a compressed inline payload; a second
    /// failure propagates unmodified. There is no third tier.
    pub async fn tag(&self, blob: &ImageBlob) -> Result<TagResult> {
        if let Some(publisher) = &self.publisher {
            if is_publicly_routable(&self.config.public_base_url) {
                match self.tag_by_url(publisher.as_ref(), blob).await {
                    Ok(result) => return Ok(result),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "URL-based tagging failed, retrying with inline data"
                        );
                    }
                }
            }
        }

        let compressed = shrink(blob, TRANSPORT_MAX_SIDE, TAGGING_JPEG_QUALITY)?;
        self.vision.tag(&ImageReference::inline(&compressed)).await
    }

    async fn tag_by_url(&self, publisher: &dyn BlobPublisher, blob: &ImageBlob) -> Result<TagResult> {
        let url = publisher.publish(blob).await?;
        self.vision.tag(&ImageReference::PublicUrl(url)).await
    }

    /// Text-only outfit recommendation over the caller's closet and
    /// weather summary.
    pub async fn recommend(&self, input: &Value) -> Result<Value> {
        self.vision.recommend(input).await
    }

    /// Produce a try-on image for a person/garment pair.
    ///
    /// The mock provider composites locally and deterministically. The
    /// remote provider needs both inputs publicly fetchable, so that
    /// path is gated on reachability up front; synthesis jobs have no
    /// inline fallback.
    pub async fn try_on(&self, person: &ImageBlob, garment: &ImageBlob) -> Result<ImageBlob> {
        match self.config.provider {
            Provider::Mock => MockCompositor::compose(person, garment),
            Provider::Remote => {
                if !is_publicly_routable(&self.config.public_base_url) {
                    return Err(FitroomError::config(format!(
                        "remote try-on requires a publicly reachable PUBLIC_BASE_URL; \
                         got `{}`",
                        self.config.public_base_url
                    )));
                }
                let publisher = self.publisher.as_deref().ok_or_else(|| {
                    FitroomError::config(
                        "remote try-on requires a blob publisher for input image URLs",
                    )
                })?;

                // Shrink before publishing so the provider's fetch (and
                // its data inspection) stays fast and timeout-free.
                let person = shrink(person, TRANSPORT_MAX_SIDE, TRYON_JPEG_QUALITY)?;
                let garment = shrink(garment, TRANSPORT_MAX_SIDE, TRYON_JPEG_QUALITY)?;
                let person_url = publisher.publish(&person).await?;
                let garment_url = publisher.publish(&garment).await?;

                let result_url = self
                    .synthesis
                    .run(
                        &ImageReference::PublicUrl(person_url),
                        &ImageReference::PublicUrl(garment_url),
                    )
                    .await?;
                self.synthesis.fetch_result(&result_url).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingPublisher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BlobPublisher for RecordingPublisher {
        async fn publish(&self, _blob: &ImageBlob) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("https://files.example.com/published.jpg".to_string())
        }
    }

    fn publisher() -> (Box<dyn BlobPublisher>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(RecordingPublisher {
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn test_blob(width: u32, height: u32) -> ImageBlob {
        let image = DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageBlob::new(bytes, "image/png")
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_tag_skips_url_path_when_base_url_not_routable() {
        // Default config: 127.0.0.1 base URL, no API key. The publisher
        // must never be consulted; the single inline attempt fails on
        // the missing key before any network I/O.
        let (publisher, calls) = publisher();
        let fitroom = Fitroom::new(Config::default()).with_publisher(publisher);

        let err = fitroom.tag(&test_blob(64, 64)).await.unwrap_err();
        assert!(matches!(err, FitroomError::Config { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tag_url_failure_falls_back_to_inline_once() {
        // Routable base URL: the blob is published and the URL attempt
        // made; it fails on the missing key, and the inline retry's
        // error (same missing key) surfaces to the caller.
        let (publisher, calls) = publisher();
        let config = Config {
            public_base_url: "https://files.example.com/".to_string(),
            ..Config::default()
        };
        let fitroom = Fitroom::new(config).with_publisher(publisher);

        let err = fitroom.tag(&test_blob(64, 64)).await.unwrap_err();
        assert!(matches!(err, FitroomError::Config { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tag_without_publisher_goes_straight_to_inline() {
        let config = Config {
            public_base_url: "https://files.example.com/".to_string(),
            ..Config::default()
        };
        let fitroom = Fitroom::new(config);
        let err = fitroom.tag(&test_blob(64, 64)).await.unwrap_err();
        assert!(matches!(err, FitroomError::Config { .. }));
    }

    #[tokio::test]
    async fn test_tag_propagates_decode_failure_on_fallback() {
        let fitroom = Fitroom::new(Config::default());
        let blob = ImageBlob::new(b"not an image".to_vec(), "image/jpeg");
        assert!(matches!(
            fitroom.tag(&blob).await,
            Err(FitroomError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_try_on_mock_provider_composites_locally() {
        let fitroom = Fitroom::new(Config::default());
        let out = fitroom
            .try_on(&test_blob(200, 300), &test_blob(100, 80))
            .await
            .unwrap();
        assert_eq!(out.content_type, "image/jpeg");
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(image::GenericImageView::dimensions(&decoded), (200, 300));
    }

    #[tokio::test]
    async fn test_try_on_remote_requires_routable_base_url() {
        let (publisher, calls) = publisher();
        let config = Config {
            provider: Provider::Remote,
            api_key: "sk-test".to_string(),
            ..Config::default()
        };
        let fitroom = Fitroom::new(config).with_publisher(publisher);
        let err = fitroom
            .try_on(&test_blob(64, 64), &test_blob(64, 64))
            .await
            .unwrap_err();
        assert!(matches!(err, FitroomError::Config { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_try_on_remote_requires_publisher() {
        let config = Config {
            provider: Provider::Remote,
            api_key: "sk-test".to_string(),
            public_base_url: "https://files.example.com/".to_string(),
            ..Config::default()
        };
        let fitroom = Fitroom::new(config);
        match fitroom.try_on(&test_blob(64, 64), &test_blob(64, 64)).await {
            Err(FitroomError::Config { message }) => {
                assert!(message.contains("publisher"), "got: {message}")
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
