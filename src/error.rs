//! Failure taxonomy and HTTP status classification.
//!
//! Every outbound call resolves to either a body or exactly one [`FailureOutcome`]. Status codes
//! fall into one of three buckets (see [`StatusClass`]); the two predicates
//! [`is_retryable_status`] and [`is_client_error`] are total over `u16` and never agree.
//!
//! ```rust
//! use pulse_client::error::{classify_status, is_client_error, is_retryable_status, StatusClass};
//!
//! assert!(is_retryable_status(503));
//! assert!(is_client_error(404));
//! assert!(!is_client_error(429)); // rate limiting is retried, not rejected
//! assert_eq!(classify_status(204), StatusClass::Success);
//! ```

use std::time::Duration;
use thiserror::Error;

/// Status codes re-issued by the retry executor.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Bucket a status code falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// `[200, 300)`.
    Success,
    /// 408, 429, 500, 502, 503, 504.
    Retryable,
    /// `[400, 500)` minus the retryable codes.
    ClientError,
    /// Anything else (1xx, 3xx, unlisted 5xx). Treated as terminal by the executor.
    Other,
}

/// True for the statuses that are safe to re-issue.
pub fn is_retryable_status(code: u16) -> bool {
    RETRYABLE_STATUSES.contains(&code)
}

/// True for 4xx statuses the remote will keep rejecting.
pub fn is_client_error(code: u16) -> bool {
    (400..500).contains(&code) && !is_retryable_status(code)
}

/// True for `[200, 300)`.
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Classify a status code into exactly one [`StatusClass`].
pub fn classify_status(code: u16) -> StatusClass {
    if is_success(code) {
        StatusClass::Success
    } else if is_retryable_status(code) {
        StatusClass::Retryable
    } else if is_client_error(code) {
        StatusClass::ClientError
    } else {
        StatusClass::Other
    }
}

/// Terminal outcome of a failed call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureOutcome {
    /// The remote answered with a non-2xx status.
    #[error("HTTP {status_code} {status_text}: {}", truncate_body(.response_body))]
    HttpFailure {
        status_code: u16,
        status_text: String,
        response_body: String,
        retryable: bool,
        request_id: Option<String>,
    },
    /// The per-attempt deadline elapsed before a response arrived.
    #[error("request timed out after {}ms", .timeout.as_millis())]
    TimeoutFailure { timeout: Duration },
    /// Connection-level failure (DNS, connect, reset, body stream).
    #[error("transport failure: {cause}")]
    TransportFailure { cause: String },
    /// Caller input rejected before any network attempt.
    #[error("validation failed: {}", .details.join("; "))]
    ValidationFailure { details: Vec<String> },
    /// A 2xx body did not match the shape the endpoint promises.
    #[error("invalid response body: {details}")]
    InvalidResponse { details: String },
}

const MAX_DISPLAYED_BODY: usize = 200;

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_DISPLAYED_BODY {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_DISPLAYED_BODY).collect();
        format!("{head}...")
    }
}

impl FailureOutcome {
    /// Build an `HttpFailure`, deriving `retryable` from the status.
    pub fn http(
        status_code: u16,
        status_text: impl Into<String>,
        response_body: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        FailureOutcome::HttpFailure {
            status_code,
            status_text: status_text.into(),
            response_body: response_body.into(),
            retryable: is_retryable_status(status_code),
            request_id,
        }
    }

    /// Build a `ValidationFailure` from one message per offending field.
    pub fn validation<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FailureOutcome::ValidationFailure { details: details.into_iter().map(Into::into).collect() }
    }

    /// Whether the retry executor may re-issue the request after this outcome.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpFailure { retryable, .. } => *retryable,
            Self::TimeoutFailure { .. } | Self::TransportFailure { .. } => true,
            Self::ValidationFailure { .. } | Self::InvalidResponse { .. } => false,
        }
    }

    /// HTTP status for `HttpFailure`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpFailure { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Request/trace id echoed by the remote, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::HttpFailure { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutFailure { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailure { .. })
    }

    /// Field messages for `ValidationFailure`.
    pub fn validation_details(&self) -> Option<&[String]> {
        match self {
            Self::ValidationFailure { details } => Some(details.as_slice()),
            _ => None,
        }
    }
}
