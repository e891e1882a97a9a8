//! Fallback wrapper.
//!
//! [`with_fallback`] turns any fallible async operation into one that always yields a value. On
//! failure it substitutes the caller's default, sets `from_fallback`, and logs the failure's
//! message at error level.
//!
//! ```rust
//! use pulse_client::{with_fallback, FailureOutcome};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let result = with_fallback(
//!     || async { Err::<u32, _>(FailureOutcome::TransportFailure { cause: "offline".into() }) },
//!     0,
//! )
//! .await;
//! assert_eq!(result.data, 0);
//! assert!(result.from_fallback);
//! # });
//! ```

use crate::telemetry::{Level, LogRecord, Logger, TracingLogger};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;

/// Value produced by [`with_fallback`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResult<T> {
    pub data: T,
    /// True exactly when the wrapped operation failed.
    pub from_fallback: bool,
}

impl<T> FallbackResult<T> {
    pub fn fresh(data: T) -> Self {
        Self { data, from_fallback: false }
    }

    pub fn fallback(data: T) -> Self {
        Self { data, from_fallback: true }
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FallbackResult<U> {
        FallbackResult { data: f(self.data), from_fallback: self.from_fallback }
    }
}

/// Run `operation`, substituting `fallback` on failure. Logs through `tracing`.
pub async fn with_fallback<T, E, Fut, Op>(operation: Op, fallback: T) -> FallbackResult<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
    Op: FnOnce() -> Fut,
{
    with_fallback_logged(operation, fallback, &TracingLogger).await
}

/// [`with_fallback`] with an explicit logger.
pub async fn with_fallback_logged<T, E, Fut, Op>(
    operation: Op,
    fallback: T,
    logger: &dyn Logger,
) -> FallbackResult<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
    Op: FnOnce() -> Fut,
{
    with_fallback_for(operation, fallback, logger, "", "").await
}

/// [`with_fallback_logged`] whose error record names the endpoint and method that failed.
pub async fn with_fallback_for<T, E, Fut, Op>(
    operation: Op,
    fallback: T,
    logger: &dyn Logger,
    endpoint: &str,
    method: &str,
) -> FallbackResult<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
    Op: FnOnce() -> Fut,
{
    match operation().await {
        Ok(data) => FallbackResult::fresh(data),
        Err(err) => {
            logger.error(LogRecord::new(
                Level::Error,
                endpoint,
                method,
                format!("operation failed, using fallback value: {}", err),
            ));
            FallbackResult::fallback(fallback)
        }
    }
}
