use super::events::{Level, LogRecord};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Logging capability injected into the retry executor and fallback wrapper.
pub trait Logger: Send + Sync + std::fmt::Debug {
    /// Consume one record. Implementations must not block for long or panic.
    fn log(&self, record: LogRecord);

    fn info(&self, record: LogRecord) {
        self.log(LogRecord { level: Level::Info, ..record });
    }

    fn warn(&self, record: LogRecord) {
        self.log(LogRecord { level: Level::Warn, ..record });
    }

    fn error(&self, record: LogRecord) {
        self.log(LogRecord { level: Level::Error, ..record });
    }
}

/// Discards all records.
#[derive(Clone, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _record: LogRecord) {}
}

/// Forwards records to the `tracing` crate with structured fields.
#[derive(Clone, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, record: LogRecord) {
        let LogRecord { endpoint, method, status, attempt, duration_ms, message, .. } = &record;
        match record.level {
            Level::Info => tracing::info!(
                endpoint = %endpoint,
                method = %method,
                status = ?status,
                attempt = ?attempt,
                duration_ms = ?duration_ms,
                "{}",
                message
            ),
            Level::Warn => tracing::warn!(
                endpoint = %endpoint,
                method = %method,
                status = ?status,
                attempt = ?attempt,
                duration_ms = ?duration_ms,
                "{}",
                message
            ),
            Level::Error => tracing::error!(
                endpoint = %endpoint,
                method = %method,
                status = ?status,
                attempt = ?attempt,
                duration_ms = ?duration_ms,
                "{}",
                message
            ),
        }
    }
}

/// Keeps records in memory, evicting the oldest once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct MemoryLogger {
    records: Arc<Mutex<VecDeque<LogRecord>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().cloned().collect()
    }

    /// Records at `level`, in emission order.
    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.lock().iter().filter(|r| r.level == level).cloned().collect()
    }

    /// True if any record's message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|r| r.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, record: LogRecord) {
        let mut guard = self.lock();
        if guard.len() >= self.capacity {
            guard.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(record);
    }
}
