#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # pulse-client
//!
//! Resilient async client core for the tutoring AI backend.
//!
//! ## Features
//!
//! - **Failure taxonomy**: one [`FailureOutcome`] type for HTTP, timeout, transport, validation,
//!   and decode failures, with status classification helpers
//! - **Retry executor** with exponential backoff, jitter, a 30 s cap, and `Retry-After` support
//! - **Per-attempt timeouts** integrated with tokio
//! - **Fallback wrapper** that turns any fallible call into a value plus a flag
//! - **Validation gate** that rejects malformed input before any network attempt
//! - **Deduplicated warmup** for backends with a cold-start penalty
//! - **Typed endpoints** for chat, risk prediction, learning paths, insights, and roster upload
//! - **Tower adapter** for hosts that compose `tower` stacks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulse_client::{ApiClient, ClientConfig, StudentRiskData};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ApiClient::new(ClientConfig::new("https://ai.example.org"));
//!     client.warmup().await;
//!
//!     let result = client
//!         .predict_risk_or_default(StudentRiskData {
//!             engagement_score: 72.0,
//!             avg_quiz_score: 64.5,
//!             attendance: 91.0,
//!             assignment_completion: 80.0,
//!         })
//!         .await;
//!     println!("{:?} (fallback: {})", result.data.risk_level, result.from_fallback);
//! }
//! ```

pub mod api;
pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod jitter;
pub mod prelude;
pub mod request;
pub mod retry;
pub mod service;
pub mod sleeper;
pub mod telemetry;
pub mod timeout;
pub mod transport;
pub mod validation;
pub mod warmup;

// Re-exports
pub use api::{
    ChatMessage, ChatRequest, ChatResponse, DailyInsightResponse, HealthResponse,
    LearningPathRequest, LearningPathResponse, RiskLevel, RiskPrediction, StudentInsightData,
    StudentRiskData, UploadResponse,
};
pub use backoff::{Backoff, MAX_BACKOFF};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{classify_status, is_client_error, is_retryable_status, FailureOutcome, StatusClass};
pub use fallback::{with_fallback, with_fallback_for, with_fallback_logged, FallbackResult};
pub use jitter::Jitter;
pub use request::{Body, FormPart, Method, RawResponse, RequestDescriptor, ResponseBody};
pub use retry::{AttemptOutcome, AttemptRecord, CallReport, RetryExecutor, RetryPolicy};
pub use service::{RetryLayer, RetryService, ServiceTransport};
pub use sleeper::{InstantSleeper, RecordingSleeper, Sleeper, TokioSleeper};
pub use telemetry::{Level, LogRecord, Logger, MemoryLogger, NullLogger, TracingLogger};
pub use timeout::send_with_timeout;
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use validation::{validate_range, validate_required, FieldValue};
pub use warmup::WarmupState;
