//! Convenient re-exports for common client types.
pub use crate::{
    backoff::{Backoff, MAX_BACKOFF},
    client::ApiClient,
    config::ClientConfig,
    error::FailureOutcome,
    fallback::{with_fallback, FallbackResult},
    jitter::Jitter,
    request::{Body, RequestDescriptor, ResponseBody},
    retry::{RetryExecutor, RetryPolicy},
    service::RetryLayer,
    sleeper::Sleeper,
    telemetry::Logger,
    transport::Transport,
    validation::{validate_range, validate_required},
};
