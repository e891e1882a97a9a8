//! Retry executor for outbound calls.
//!
//! Semantics:
//! - `max_retries` counts retries, so a call makes at most `1 + max_retries` attempts.
//! - Each attempt is bounded by `policy.timeout` through [`send_with_timeout`].
//! - 2xx ends the call with the response. Any other status outside the retryable set
//!   (see [`crate::error::is_retryable_status`]) ends it immediately with a non-retryable
//!   `HttpFailure`, whatever budget remains.
//! - Retryable statuses, timeouts, and transport failures wait and try again. A 429 carrying a
//!   positive integer `Retry-After` waits that many seconds; every other case waits
//!   `Backoff::delay(attempt)`. No wait follows the final attempt.
//! - On exhaustion the most recent failure propagates, not the first.
//!
//! Invariants:
//! - Attempts are strictly sequential; attempt `n + 1` starts after attempt `n` is classified and
//!   its wait has elapsed.
//! - Every attempt, wait, and terminal failure produces one record on the injected [`Logger`].
//!
//! Example
//! ```rust,no_run
//! use pulse_client::{RequestDescriptor, RetryExecutor, RetryPolicy, ReqwestTransport};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pulse_client::FailureOutcome> {
//! let executor = RetryExecutor::new(Arc::new(ReqwestTransport::new()));
//! let body = executor
//!     .execute(&RequestDescriptor::get("https://backend.example/health"), RetryPolicy::default())
//!     .await?;
//! println!("{:?}", body);
//! # Ok(())
//! # }
//! ```

use crate::backoff::Backoff;
use crate::error::{is_success, FailureOutcome};
use crate::jitter::Jitter;
use crate::request::{RawResponse, RequestDescriptor, ResponseBody, REQUEST_ID_HEADER};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::telemetry::{Level, LogRecord, Logger, TracingLogger};
use crate::timeout::{send_with_timeout, Attempt};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_BASE_BACKOFF_MS: u64 = 1_000;

/// Per-call retry settings. Cheap to copy; callers pass it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,
    /// Wall-clock budget of a single attempt.
    #[serde(rename = "timeoutMs", with = "duration_ms")]
    pub timeout: Duration,
    #[serde(rename = "baseBackoffMs", with = "duration_ms")]
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            base_backoff: Duration::from_millis(DEFAULT_BASE_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, timeout: Duration, base_backoff: Duration) -> Self {
        Self { max_retries, timeout, base_backoff }
    }

    /// Single attempt, default timeout.
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Chat and other user-facing round trips.
    pub fn interactive() -> Self {
        Self { max_retries: 2, timeout: Duration::from_secs(15), ..Self::default() }
    }

    /// LLM text generation (learning paths, insights); slow but worth waiting for.
    pub fn generation() -> Self {
        Self { max_retries: 3, timeout: Duration::from_secs(60), ..Self::default() }
    }

    /// Cold-start ping: one attempt, short budget.
    pub fn warmup() -> Self {
        Self { max_retries: 0, timeout: Duration::from_secs(10), ..Self::default() }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    /// Upper bound on attempts for one call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success { status: u16 },
    Failure(FailureOutcome),
}

/// Diagnostic trace of one attempt. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// Zero-based attempt index.
    pub index: u32,
    pub started_at: SystemTime,
    pub duration: Duration,
    pub outcome: AttemptOutcome,
}

/// Result of a call together with the per-attempt trace.
#[derive(Debug, Clone)]
pub struct CallReport {
    pub result: Result<RawResponse, FailureOutcome>,
    pub attempts: Vec<AttemptRecord>,
}

impl CallReport {
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}

/// Parse a `Retry-After` value given in whole seconds. Zero, negative, fractional, and HTTP-date
/// values are ignored.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let secs = value?.trim().parse::<u64>().ok()?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Drives repeated bounded attempts for one request according to a [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn Logger>,
    jitter: Jitter,
    request_id_header: String,
}

impl RetryExecutor {
    /// Executor with tokio sleeps, tracing logs, and uniform jitter.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            logger: Arc::new(TracingLogger),
            jitter: Jitter::Uniform,
            request_id_header: REQUEST_ID_HEADER.to_string(),
        }
    }

    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Like [`with_sleeper`](Self::with_sleeper) for a sleeper that is already shared.
    pub fn with_shared_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Header used both to stamp outbound requests and to read the remote's request id.
    pub fn with_request_id_header(mut self, name: impl Into<String>) -> Self {
        self.request_id_header = name.into().to_ascii_lowercase();
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Run the call and return the parsed body of the successful response.
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
        policy: RetryPolicy,
    ) -> Result<ResponseBody, FailureOutcome> {
        self.execute_raw(request, policy).await.map(|resp| resp.parse_body())
    }

    /// Run the call and return the successful raw response.
    pub async fn execute_raw(
        &self,
        request: &RequestDescriptor,
        policy: RetryPolicy,
    ) -> Result<RawResponse, FailureOutcome> {
        self.execute_with_report(request, policy).await.result
    }

    /// Run the call and also return the per-attempt trace.
    pub async fn execute_with_report(
        &self,
        request: &RequestDescriptor,
        policy: RetryPolicy,
    ) -> CallReport {
        let request = self.stamp_request_id(request);
        let backoff = Backoff::new(policy.base_backoff).with_jitter(self.jitter);
        let mut attempts = Vec::new();
        let mut attempt: u32 = 0;

        loop {
            let started_at = SystemTime::now();
            let Attempt { outcome, elapsed } =
                send_with_timeout(self.transport.as_ref(), &request, policy.timeout).await;

            let (failure, retry_after) = match outcome {
                Ok(response) if is_success(response.status) => {
                    self.logger.info(
                        self.record(&request, Level::Info, "request succeeded")
                            .status(response.status)
                            .attempt(attempt)
                            .duration(elapsed),
                    );
                    attempts.push(AttemptRecord {
                        index: attempt,
                        started_at,
                        duration: elapsed,
                        outcome: AttemptOutcome::Success { status: response.status },
                    });
                    return CallReport { result: Ok(response), attempts };
                }
                Ok(response) => {
                    let failure = self.http_failure(&response);
                    let retry_after = if response.status == 429 {
                        parse_retry_after(response.header("retry-after"))
                    } else {
                        None
                    };
                    (failure, retry_after)
                }
                Err(failure) => (failure, None),
            };

            attempts.push(AttemptRecord {
                index: attempt,
                started_at,
                duration: elapsed,
                outcome: AttemptOutcome::Failure(failure.clone()),
            });

            if !failure.is_retryable() {
                self.logger.error(
                    self.failure_record(&request, &failure, attempt, elapsed)
                        .prefixed("non-retryable failure"),
                );
                return CallReport { result: Err(failure), attempts };
            }

            self.logger.warn(
                self.failure_record(&request, &failure, attempt, elapsed)
                    .prefixed("attempt failed"),
            );

            if attempt >= policy.max_retries {
                self.logger.error(
                    self.failure_record(&request, &failure, attempt, elapsed).prefixed(
                        &format!("retries exhausted after {} attempts", attempt + 1),
                    ),
                );
                return CallReport { result: Err(failure), attempts };
            }

            let (wait, source) = match retry_after {
                Some(wait) => (wait, "retry-after"),
                None => (backoff.delay(attempt), "backoff"),
            };
            self.logger.info(
                self.record(
                    &request,
                    Level::Info,
                    format!("waiting {}ms ({}) before retry {}", wait.as_millis(), source, attempt + 1),
                )
                .attempt(attempt)
                .duration(wait),
            );
            self.sleeper.sleep(wait).await;
            attempt += 1;
        }
    }

    fn stamp_request_id(&self, request: &RequestDescriptor) -> RequestDescriptor {
        if request.header(&self.request_id_header).is_some() {
            request.clone()
        } else {
            request
                .clone()
                .with_header(&self.request_id_header, uuid::Uuid::new_v4().to_string())
        }
    }

    fn http_failure(&self, response: &RawResponse) -> FailureOutcome {
        FailureOutcome::http(
            response.status,
            response.status_text.clone(),
            response.body_text(),
            response.header(&self.request_id_header).map(str::to_owned),
        )
    }

    fn record(
        &self,
        request: &RequestDescriptor,
        level: Level,
        message: impl Into<String>,
    ) -> LogRecord {
        LogRecord::new(level, request.endpoint(), request.method().as_str(), message)
    }

    fn failure_record(
        &self,
        request: &RequestDescriptor,
        failure: &FailureOutcome,
        attempt: u32,
        elapsed: Duration,
    ) -> LogRecord {
        let mut record = self
            .record(request, Level::Warn, failure.to_string())
            .attempt(attempt)
            .duration(elapsed);
        if let Some(status) = failure.status() {
            record = record.status(status);
        }
        record
    }
}
