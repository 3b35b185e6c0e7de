//! Shared retry and polling policies for the remote provider calls.
//!
//! Two nearly-identical retry blocks exist in the wild for this
//! provider: a single fixed-delay retry around one-shot POSTs, and a
//! deadline-bounded poll loop. Both live here so they can be tested
//! without HTTP.

use crate::error::{FitroomError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Fixed delay between the first attempt and the single retry of a
/// one-shot call (submit, chat completion).
pub const TRANSPORT_RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Sleep between poll iterations, including after error iterations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1200);

/// Run `op`, retrying once after [`TRANSPORT_RETRY_DELAY`] if it fails
/// with a `Transport` error. Any other error kind is returned
/// immediately; the retry's error, if any, is returned untouched.
pub async fn retry_transient<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(FitroomError::Transport { message }) => {
            tracing::debug!(error = %message, "transport failure, retrying once");
            tokio::time::sleep(TRANSPORT_RETRY_DELAY).await;
            op().await
        }
        Err(other) => Err(other),
    }
}

/// One observation of a polled job.
#[derive(Debug)]
pub enum PollState<T> {
    /// Terminal success
    Complete(T),
    /// Not done yet; `raw` is the response body (when one was read)
    /// kept for the timeout diagnostic
    Pending { raw: Option<String> },
}

/// Drive `op` until it completes, fails, or the wall-clock budget runs
/// out.
///
/// The loop is bounded only by `max_wait` (there is no attempt counter)
/// and it sleeps for `interval` after every non-terminal iteration, so
/// a fast-failing provider cannot spin the loop hot.
/// `op` is expected to map transient problems (transport errors,
/// non-2xx statuses) to `Pending` and reserve `Err` for terminal
/// failures, which abort immediately.
pub async fn poll_until_complete<T, F, Fut>(
    max_wait: Duration,
    interval: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    let deadline = Instant::now() + max_wait;
    let mut last_raw = String::new();

    while Instant::now() < deadline {
        match op().await? {
            PollState::Complete(value) => return Ok(value),
            PollState::Pending { raw } => {
                if let Some(raw) = raw {
                    last_raw = raw;
                }
            }
        }
        tokio::time::sleep(interval).await;
    }

    Err(FitroomError::Timeout {
        waited: max_wait,
        last_body: last_raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_recovers_on_second_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result = retry_transient(move || {
            let calls = calls_ref.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FitroomError::transport("connection reset"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_gives_up_after_one_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result: Result<()> = retry_transient(move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FitroomError::transport("still down"))
            }
        })
        .await;

        assert!(matches!(result, Err(FitroomError::Transport { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_does_not_retry_remote_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result: Result<()> = retry_transient(move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FitroomError::remote(Some(400), "bad request"))
            }
        })
        .await;

        assert!(matches!(result, Err(FitroomError::Remote { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_completes_after_pending_iterations() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let url: String = poll_until_complete(Duration::from_secs(120), POLL_INTERVAL, move || {
            let calls = calls_ref.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok(PollState::Pending {
                        raw: Some("{\"output\":{\"task_status\":\"RUNNING\"}}".into()),
                    })
                } else {
                    Ok(PollState::Complete("https://cdn.example.com/out.jpg".to_string()))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(url, "https://cdn.example.com/out.jpg");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_terminal_error_aborts_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result: Result<String> =
            poll_until_complete(Duration::from_secs(120), POLL_INTERVAL, move || {
                let calls = calls_ref.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(FitroomError::remote(None, "task FAILED"))
                }
            })
            .await;

        assert!(matches!(result, Err(FitroomError::Remote { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_deadline_reports_last_body_and_keeps_attempting() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let max_wait = Duration::from_secs(12);
        let result: Result<String> = poll_until_complete(max_wait, POLL_INTERVAL, move || {
            let calls = calls_ref.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(PollState::Pending {
                    raw: Some(format!("body-{n}")),
                })
            }
        })
        .await;

        match result {
            Err(FitroomError::Timeout { waited, last_body }) => {
                assert_eq!(waited, max_wait);
                assert!(last_body.starts_with("body-"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // Wall-clock budget, fixed interval: at least floor(12 / 1.2) polls
        assert!(calls.load(Ordering::SeqCst) >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_sleeps_after_error_iterations_too() {
        // Pending-with-no-body (the transport-error mapping) must still
        // consume an interval per iteration rather than spin.
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let start = Instant::now();
        let _ = poll_until_complete::<String, _, _>(
            Duration::from_secs(6),
            POLL_INTERVAL,
            move || {
                let calls = calls_ref.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(PollState::Pending { raw: None })
                }
            },
        )
        .await;

        let elapsed = start.elapsed();
        let attempts = calls.load(Ordering::SeqCst) as u128;
        assert!(elapsed.as_millis() >= (attempts - 1) * 1200);
    }
}
