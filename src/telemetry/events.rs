use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// One structured diagnostic record.
///
/// Every attempt, retry, backoff wait, and terminal failure produces exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
    pub level: Level,
    pub endpoint: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub message: String,
}

impl LogRecord {
    /// Start a record stamped with the current wall-clock time.
    pub fn new(
        level: Level,
        endpoint: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: now_millis(),
            level,
            endpoint: endpoint.into(),
            method: method.into(),
            status: None,
            attempt: None,
            duration_ms: None,
            message: message.into(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(clamp_u64(duration.as_millis()));
        self
    }

    /// Prepend `prefix: ` to the message.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.message = format!("{}: {}", prefix, self.message);
        self
    }

    /// Render as a JSON object for line-oriented sinks.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "message": self.message }))
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.level, self.method, self.endpoint)?;
        if let Some(attempt) = self.attempt {
            write!(f, " attempt={}", attempt)?;
        }
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(ms) = self.duration_ms {
            write!(f, " duration={}ms", ms)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[inline]
fn clamp_u64(val: u128) -> u64 {
    val.min(u128::from(u64::MAX)) as u64
}

fn now_millis() -> u64 {
    clamp_u64(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let record = LogRecord::new(Level::Warn, "/api/chat", "POST", "retrying")
            .status(503)
            .attempt(1)
            .duration(Duration::from_millis(42));
        assert_eq!(record.status, Some(503));
        assert_eq!(record.attempt, Some(1));
        assert_eq!(record.duration_ms, Some(42));
        assert!(record.timestamp > 0);
    }

    #[test]
    fn json_uses_camel_case_and_skips_missing_fields() {
        let record = LogRecord::new(Level::Info, "/health", "GET", "ok").duration(Duration::ZERO);
        let v = record.to_json();
        assert_eq!(v["level"], "info");
        assert_eq!(v["durationMs"], 0);
        assert!(v.get("status").is_none());
        assert!(v.get("attempt").is_none());
    }

    #[test]
    fn display_is_single_line() {
        let record =
            LogRecord::new(Level::Error, "/api/predict-risk", "POST", "gave up").status(500).attempt(3);
        let line = record.to_string();
        assert_eq!(line, "[error] POST /api/predict-risk attempt=3 status=500: gave up");
    }
}
