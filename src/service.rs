//! Tower adapter.
//!
//! [`RetryService`] exposes a [`RetryExecutor`] as a
//! `Service<RequestDescriptor, Response = ResponseBody, Error = FailureOutcome>`.
//! [`RetryLayer`] wraps any single-shot tower service that speaks
//! `RequestDescriptor -> RawResponse` so the executor drives it as its transport.
//!
//! ```rust
//! use pulse_client::{RawResponse, RequestDescriptor, RetryLayer, RetryPolicy, TransportError};
//! use tower::{service_fn, Layer, ServiceExt};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let backend = service_fn(|_req: RequestDescriptor| async {
//!     Ok::<_, TransportError>(RawResponse::new(200).with_body(r#"{"status":"healthy"}"#))
//! });
//! let svc = RetryLayer::new(RetryPolicy::interactive()).layer(backend);
//! let body = svc.oneshot(RequestDescriptor::get("http://backend/health")).await.unwrap();
//! assert_eq!(body.as_json().unwrap()["status"], "healthy");
//! # });
//! ```

use crate::error::FailureOutcome;
use crate::jitter::Jitter;
use crate::request::{RawResponse, RequestDescriptor, ResponseBody};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::telemetry::{Logger, TracingLogger};
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// Service that runs every request through a [`RetryExecutor`] under a fixed policy.
#[derive(Clone, Debug)]
pub struct RetryService {
    executor: RetryExecutor,
    policy: RetryPolicy,
}

impl RetryService {
    pub fn new(executor: RetryExecutor, policy: RetryPolicy) -> Self {
        Self { executor, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl Service<RequestDescriptor> for RetryService {
    type Response = ResponseBody;
    type Error = FailureOutcome;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    // No backpressure: every call is admitted.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RequestDescriptor) -> Self::Future {
        let executor = self.executor.clone();
        let policy = self.policy;
        Box::pin(async move { executor.execute(&req, policy).await })
    }
}

/// Uses a tower service as a single-shot [`Transport`].
#[derive(Clone)]
pub struct ServiceTransport<S> {
    inner: S,
}

impl<S> ServiceTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S> fmt::Debug for ServiceTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S> Transport for ServiceTransport<S>
where
    S: Service<RequestDescriptor, Response = RawResponse, Error = TransportError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut svc = self.inner.clone();
        futures::future::poll_fn(|cx| svc.poll_ready(cx)).await?;
        svc.call(request.clone()).await
    }
}

/// Layer producing a [`RetryService`] around an inner single-shot service.
#[derive(Clone, Debug)]
pub struct RetryLayer {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn Logger>,
    jitter: Jitter,
}

impl RetryLayer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            logger: Arc::new(TracingLogger),
            jitter: Jitter::Uniform,
        }
    }

    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
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
}

impl<S> Layer<S> for RetryLayer
where
    S: Service<RequestDescriptor, Response = RawResponse, Error = TransportError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    type Service = RetryService;

    fn layer(&self, inner: S) -> Self::Service {
        let executor = RetryExecutor::new(Arc::new(ServiceTransport::new(inner)))
            .with_shared_sleeper(self.sleeper.clone())
            .with_logger(self.logger.clone())
            .with_jitter(self.jitter);
        RetryService::new(executor, self.policy)
    }
}
