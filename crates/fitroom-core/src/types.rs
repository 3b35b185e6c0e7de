//! Core data types shared across the orchestration components.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::Instant;

/// Raw image bytes plus their declared content type.
///
/// Produced by the caller layer (upload handling is out of scope here)
/// and consumed by the preprocessor, which may replace it with a
/// resized, re-encoded copy. Never persisted by this crate.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }
}

/// How an image is handed to a remote model: fetched by the provider
/// from a public URL, or carried inline in the request payload.
#[derive(Debug, Clone)]
pub enum ImageReference {
    PublicUrl(String),
    InlineData { data: Vec<u8>, mime_type: String },
}

impl ImageReference {
    pub fn inline(blob: &ImageBlob) -> Self {
        Self::InlineData {
            data: blob.bytes.clone(),
            mime_type: blob.content_type.clone(),
        }
    }

    /// Render the reference as the string the chat API accepts: the
    /// plain URL, or a `data:<mime>;base64,<payload>` URL.
    pub fn as_model_url(&self) -> String {
        match self {
            Self::PublicUrl(url) => url.clone(),
            Self::InlineData { data, mime_type } => format!(
                "data:{mime_type};base64,{}",
                base64::engine::general_purpose::STANDARD.encode(data)
            ),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::InlineData { .. })
    }
}

/// Structured tagging output from the vision model.
///
/// The remote model is not contractually bound to this schema, so every
/// known field is optional and unrecognized keys are preserved in
/// `extra` for downstream consumers to read opportunistically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Any keys the model returned beyond the known schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle state of a remote synthesis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Position in the forward-only lifecycle.
    fn rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::Polling => 1,
            Self::Succeeded | Self::Failed | Self::TimedOut => 2,
        }
    }
}

/// An in-flight remote synthesis job. Lives only on the call stack of
/// the request that created it; there is no job registry.
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    pub task_id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub submitted_at: Instant,
    pub deadline: Instant,
}

impl SynthesisJob {
    pub fn submitted(task_id: impl Into<String>, max_wait: std::time::Duration) -> Self {
        let now = Instant::now();
        Self {
            task_id: task_id.into(),
            status: JobStatus::Submitted,
            result_url: None,
            submitted_at: now,
            deadline: now + max_wait,
        }
    }

    /// Move the job forward. Transitions never go backward and a
    /// terminal job is never revived; an out-of-order request is a
    /// no-op.
    pub fn advance(&mut self, status: JobStatus) {
        if self.status.is_terminal() || status.rank() < self.status.rank() {
            return;
        }
        self.status = status;
    }

    pub fn succeed(&mut self, result_url: impl Into<String>) {
        self.advance(JobStatus::Succeeded);
        if self.status == JobStatus::Succeeded {
            self.result_url = Some(result_url.into());
        }
    }
}
