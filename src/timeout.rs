//! Cancellable single attempt.
//!
//! [`send_with_timeout`] drives one [`Transport::send`] under a deadline. If the deadline fires
//! first the in-flight future is dropped (the caller stops waiting; bytes may still be on the
//! wire) and the attempt reports [`FailureOutcome::TimeoutFailure`]. Transport errors map to
//! [`FailureOutcome::TransportFailure`]. Any response, whatever its status, is passed through.

use crate::error::FailureOutcome;
use crate::request::{RawResponse, RequestDescriptor};
use crate::transport::Transport;
use std::time::Duration;
use tokio::time::Instant;

/// Result of one bounded attempt, with how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub outcome: Result<RawResponse, FailureOutcome>,
    pub elapsed: Duration,
}

/// Issue one request bounded by `timeout`.
pub async fn send_with_timeout(
    transport: &dyn Transport,
    request: &RequestDescriptor,
    timeout: Duration,
) -> Attempt {
    let start = Instant::now();
    let outcome = match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(err)) => Err(FailureOutcome::TransportFailure { cause: err.cause }),
        Err(_) => Err(FailureOutcome::TimeoutFailure { timeout }),
    };
    Attempt { outcome, elapsed: start.elapsed() }
}
