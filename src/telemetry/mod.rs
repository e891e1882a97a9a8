//! Diagnostic records and the logger capability.
//!
//! The retry executor and fallback wrapper never call a global logging macro. They receive an
//! `Arc<dyn Logger>` and hand it one [`LogRecord`] per attempt, retry wait, and terminal failure.
//!
//! # Loggers
//!
//! - [`TracingLogger`]: forwards to `tracing` with structured fields (production default).
//! - [`MemoryLogger`]: bounded in-memory capture for tests and diagnostics panels.
//! - [`NullLogger`]: discards everything.

pub mod events;
pub mod sinks;

pub use events::{Level, LogRecord};
pub use sinks::{Logger, MemoryLogger, NullLogger, TracingLogger};
