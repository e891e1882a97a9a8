//! Request and response bodies of the AI backend.
//!
//! Field names follow the backend's camelCase JSON. Range and presence checks live in
//! [`ApiClient`](crate::client::ApiClient), which runs them before any network attempt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Number of prior chat turns forwarded with a message.
pub const MAX_CHAT_HISTORY: usize = 10;

/// Inclusive bounds shared by every percentage metric.
pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

/// File extensions accepted by the class-records upload.
pub const UPLOAD_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "pdf"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Keep only the most recent [`MAX_CHAT_HISTORY`] turns.
    pub fn trimmed(mut self) -> Self {
        let excess = self.history.len().saturating_sub(MAX_CHAT_HISTORY);
        self.history.drain(..excess);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRiskData {
    pub engagement_score: f64,
    pub avg_quiz_score: f64,
    pub attendance: f64,
    pub assignment_completion: f64,
}

impl StudentRiskData {
    /// `(json name, value)` pairs for range checking.
    pub fn metrics(&self) -> [(&'static str, f64); 4] {
        [
            ("engagementScore", self.engagement_score),
            ("avgQuizScore", self.avg_quiz_score),
            ("attendance", self.attendance),
            ("assignmentCompletion", self.assignment_completion),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskAnalysis {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPrediction {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    #[serde(default)]
    pub analysis: RiskAnalysis,
}

impl RiskPrediction {
    /// Neutral prediction used when the model cannot be reached.
    pub fn unknown() -> Self {
        Self { risk_level: RiskLevel::Medium, confidence: 0.0, analysis: RiskAnalysis::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRiskRequest {
    pub students: Vec<StudentRiskData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathRequest {
    pub weaknesses: Vec<String>,
    pub grade_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathResponse {
    pub learning_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInsightData {
    pub name: String,
    pub engagement_score: f64,
    pub avg_quiz_score: f64,
    pub attendance: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsightRequest {
    pub students: Vec<StudentInsightData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyInsightResponse {
    pub insight: String,
}

/// Parsed class roster returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub students: Vec<Map<String, Value>>,
    /// Source column name to roster field name.
    #[serde(default)]
    pub column_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Extension of `file_name` if it is one the upload endpoint accepts. Matching is
/// case-sensitive, as on the backend: `roster.CSV` is refused.
pub fn upload_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    UPLOAD_EXTENSIONS.contains(&ext).then(|| ext.to_string())
}
