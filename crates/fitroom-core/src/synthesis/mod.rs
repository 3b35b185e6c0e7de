//! Remote two-image synthesis (virtual try-on) job client.
//!
//! The provider runs these jobs asynchronously: submit returns a task
//! id, then the task endpoint is polled until a terminal state or the
//! wall-clock budget runs out. The provider only accepts public URLs
//! for this job type; there is no inline-data calling convention.

mod protocol;

use crate::config::Config;
use crate::error::{FitroomError, Result};
use crate::reachability::is_publicly_routable;
use crate::retry::{poll_until_complete, retry_transient, PollState, POLL_INTERVAL};
use crate::types::{ImageBlob, ImageReference, JobStatus, SynthesisJob};
use serde_json::{json, Value};
use std::time::Duration;

const SYNTHESIS_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/image2image/image-synthesis/";
const TASKS_ENDPOINT: &str = "https://dashscope.aliyuncs.com/api/v1/tasks";

/// Fixed model identifier for the try-on job type.
const SYNTHESIS_MODEL: &str = "aitryon";

/// Client for submitting and polling remote synthesis jobs.
pub struct SynthesisJobClient {
    client: reqwest::Client,
    api_key: String,
    public_base_url: String,
    submit_endpoint: String,
    tasks_endpoint: String,
    read_timeout: Duration,
    max_wait: Duration,
}

impl SynthesisJobClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoints(config, SYNTHESIS_ENDPOINT, TASKS_ENDPOINT)
    }

    /// Create with custom endpoints (regional deployments).
    pub fn with_endpoints(config: &Config, submit_endpoint: &str, tasks_endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("failed to construct HTTP client");
        Self {
            client,
            api_key: config.api_key.trim().to_string(),
            public_base_url: config.public_base_url.clone(),
            submit_endpoint: submit_endpoint.to_string(),
            tasks_endpoint: tasks_endpoint.trim_end_matches('/').to_string(),
            read_timeout: config.read_timeout,
            max_wait: config.max_wait,
        }
    }

    /// Submit a try-on job and return its in-flight handle.
    ///
    /// Fails fast with a `Config` error when the credential is missing,
    /// when the configured base URL is not publicly routable (the
    /// provider must be able to fetch the referenced images), or when
    /// either reference is inline data.
    pub async fn submit(
        &self,
        person: &ImageReference,
        garment: &ImageReference,
    ) -> Result<SynthesisJob> {
        if self.api_key.is_empty() {
            return Err(FitroomError::config("DASHSCOPE_API_KEY is not set"));
        }
        if !is_publicly_routable(&self.public_base_url) {
            return Err(FitroomError::config(format!(
                "synthesis requires a publicly reachable PUBLIC_BASE_URL so the provider can \
                 fetch input images; got `{}`",
                self.public_base_url
            )));
        }
        let (person_url, garment_url) = match (person, garment) {
            (ImageReference::PublicUrl(p), ImageReference::PublicUrl(g)) => (p, g),
            _ => {
                return Err(FitroomError::config(
                    "the synthesis provider only accepts public image URLs, not inline data",
                ))
            }
        };

        let body = submit_body(person_url, garment_url);
        let response: Value = retry_transient(|| self.post_submit(&body)).await?;

        let task_id = protocol::extract_task_id(&response).ok_or_else(|| {
            FitroomError::remote(
                None,
                format!("submit response carried no task id: {response}"),
            )
        })?;

        tracing::info!(task_id = %task_id, "synthesis job submitted");
        Ok(SynthesisJob::submitted(task_id, self.max_wait))
    }

    /// Poll the task endpoint until the job reaches a terminal state or
    /// the wall-clock budget elapses. Returns the result image URL.
    ///
    /// Transport errors and non-2xx statuses are treated as transient:
    /// the loop sleeps its fixed interval and asks again, bounded only
    /// by the deadline.
    pub async fn poll_until_done(&self, job: &mut SynthesisJob) -> Result<String> {
        job.advance(JobStatus::Polling);
        let task_id = job.task_id.clone();

        let outcome =
            poll_until_complete(self.max_wait, POLL_INTERVAL, || self.poll_once(&task_id)).await;

        match outcome {
            Ok(url) => {
                job.succeed(url.clone());
                Ok(url)
            }
            Err(err @ FitroomError::Timeout { .. }) => {
                job.advance(JobStatus::TimedOut);
                Err(err)
            }
            Err(err) => {
                job.advance(JobStatus::Failed);
                Err(err)
            }
        }
    }

    /// Submit and poll in one call.
    pub async fn run(
        &self,
        person: &ImageReference,
        garment: &ImageReference,
    ) -> Result<String> {
        let mut job = self.submit(person, garment).await?;
        self.poll_until_done(&mut job).await
    }

    /// Download the finished result image.
    pub async fn fetch_result(&self, url: &str) -> Result<ImageBlob> {
        let response = self
            .client
            .get(url)
            .timeout(self.read_timeout)
            .send()
            .await
            .map_err(|e| FitroomError::transport(format!("result download failed: {e}")))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(FitroomError::remote(
                Some(status.as_u16()),
                "result image download was refused".to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FitroomError::transport(format!("result download failed: {e}")))?;
        Ok(ImageBlob::new(bytes.to_vec(), content_type))
    }

    async fn post_submit(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.submit_endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-DashScope-Async", "enable")
            .json(body)
            .timeout(self.read_timeout)
            .send()
            .await
            .map_err(|e| FitroomError::transport(format!("job submit failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.as_u16() >= 300 {
            return Err(FitroomError::remote(Some(status.as_u16()), text));
        }

        serde_json::from_str(&text).map_err(|e| FitroomError::MalformedResponse {
            message: format!("submit response is not JSON: {e}"),
            raw: text,
        })
    }

    /// One poll round trip, mapping transient problems to `Pending`.
    async fn poll_once(&self, task_id: &str) -> Result<PollState<String>> {
        let url = format!("{}/{}", self.tasks_endpoint, task_id);
        let response = match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.read_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(task_id, error = %e, "poll transport error, will retry");
                return Ok(PollState::Pending { raw: None });
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.as_u16() >= 300 {
            tracing::debug!(task_id, status = status.as_u16(), "poll got error status, will retry");
            return Ok(PollState::Pending { raw: Some(text) });
        }

        protocol::parse_poll_body(&text)
    }
}

/// The fixed single-garment-slot submit payload.
fn submit_body(person_url: &str, garment_url: &str) -> Value {
    json!({
        "model": SYNTHESIS_MODEL,
        "input": {
            "person_image_url": person_url,
            "top_garment_url": garment_url,
        },
        "parameters": {
            "resolution": -1,
            "restore_face": true,
        },
    })
}
