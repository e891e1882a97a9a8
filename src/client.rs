//! Typed client for the AI backend.
//!
//! Every endpoint runs the same pipeline: validation gate, then the retry executor, then decoding
//! of the 2xx body into the endpoint's response type. Validation failures never reach the
//! network.

use crate::api::{
    upload_extension, BatchRiskRequest, ChatRequest, ChatResponse, DailyInsightRequest,
    DailyInsightResponse, HealthResponse, LearningPathRequest, LearningPathResponse,
    RiskPrediction, StudentInsightData, StudentRiskData, UploadResponse, METRIC_MAX, METRIC_MIN,
};
use crate::config::ClientConfig;
use crate::error::FailureOutcome;
use crate::fallback::{with_fallback_for, FallbackResult};
use crate::request::{Body, FormPart, Method, RequestDescriptor, ResponseBody};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::transport::{ReqwestTransport, Transport};
use crate::validation::{validate_all, validate_non_empty, validate_ranges, validate_required};
use crate::warmup::WarmupState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

const HEALTH_PATH: &str = "/health";
const CHAT_PATH: &str = "/api/chat";
const PREDICT_RISK_PATH: &str = "/api/predict-risk";
const PREDICT_RISK_BATCH_PATH: &str = "/api/predict-risk/batch";
const LEARNING_PATH_PATH: &str = "/api/learning-path";
const DAILY_INSIGHT_PATH: &str = "/api/analytics/daily-insight";
const UPLOAD_PATH: &str = "/api/upload/class-records";

/// Client bound to one backend. Clones share the transport and the warmup state.
#[derive(Clone, Debug)]
pub struct ApiClient {
    executor: RetryExecutor,
    config: ClientConfig,
    warmup: WarmupState,
}

impl ApiClient {
    /// Client over a default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_executor(config, RetryExecutor::new(transport))
    }

    /// Client over a preconfigured executor. The config's request-id header wins.
    pub fn with_executor(config: ClientConfig, executor: RetryExecutor) -> Self {
        let executor = executor.with_request_id_header(config.request_id_header.clone());
        Self { executor, config, warmup: WarmupState::new() }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    pub fn warmup_state(&self) -> &WarmupState {
        &self.warmup
    }

    /// Issue an arbitrary request under `policy`.
    pub async fn call(
        &self,
        request: &RequestDescriptor,
        policy: RetryPolicy,
    ) -> Result<ResponseBody, FailureOutcome> {
        self.executor.execute(request, policy).await
    }

    /// [`call`](Self::call) with the configured default policy.
    pub async fn call_default(&self, request: &RequestDescriptor) -> Result<ResponseBody, FailureOutcome> {
        self.call(request, self.config.default_policy).await
    }

    /// Ping the warmup path once per client. Concurrent and repeated calls share the first
    /// ping's result, including a failed one.
    pub async fn warmup(&self) -> bool {
        let executor = self.executor.clone();
        let request = RequestDescriptor::get(self.config.url_for(&self.config.warmup_path));
        self.warmup
            .get_or_start(move || async move {
                executor.execute_raw(&request, RetryPolicy::warmup()).await.is_ok()
            })
            .await
    }

    pub async fn health(&self) -> Result<HealthResponse, FailureOutcome> {
        let request = RequestDescriptor::get(self.config.url_for(HEALTH_PATH));
        decode(self.call(&request, RetryPolicy::interactive()).await?)
    }

    /// Send a chat message. History is trimmed to the most recent turns before sending.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, FailureOutcome> {
        validate_required([("message", request.message.as_str())])?;
        self.post_json(CHAT_PATH, &request.trimmed(), RetryPolicy::generation()).await
    }

    pub async fn predict_risk(&self, data: StudentRiskData) -> Result<RiskPrediction, FailureOutcome> {
        validate_metrics(None, &data)?;
        self.post_json(PREDICT_RISK_PATH, &data, RetryPolicy::interactive()).await
    }

    /// [`predict_risk`](Self::predict_risk) that never fails; an unreachable model yields a
    /// neutral prediction flagged `from_fallback`.
    pub async fn predict_risk_or_default(&self, data: StudentRiskData) -> FallbackResult<RiskPrediction> {
        with_fallback_for(
            || self.predict_risk(data),
            RiskPrediction::unknown(),
            self.executor.logger().as_ref(),
            PREDICT_RISK_PATH,
            Method::Post.as_str(),
        )
        .await
    }

    pub async fn predict_risk_batch(
        &self,
        students: Vec<StudentRiskData>,
    ) -> Result<Vec<RiskPrediction>, FailureOutcome> {
        validate_all(students.iter().enumerate().map(|(i, data)| validate_metrics(Some(i), data)))?;
        let body = BatchRiskRequest { students };
        self.post_json(PREDICT_RISK_BATCH_PATH, &body, RetryPolicy::generation()).await
    }

    pub async fn learning_path(
        &self,
        request: LearningPathRequest,
    ) -> Result<LearningPathResponse, FailureOutcome> {
        validate_all([
            validate_non_empty("weaknesses", request.weaknesses.len()),
            validate_required([("gradeLevel", request.grade_level.as_str())]),
        ])?;
        self.post_json(LEARNING_PATH_PATH, &request, RetryPolicy::generation()).await
    }

    pub async fn daily_insight(
        &self,
        students: Vec<StudentInsightData>,
    ) -> Result<DailyInsightResponse, FailureOutcome> {
        let names: Vec<(String, &str)> = students
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("students[{i}].name"), s.name.as_str()))
            .collect();
        validate_required(names.iter().map(|(field, name)| (field.as_str(), *name)))?;
        let body = DailyInsightRequest { students };
        self.post_json(DAILY_INSIGHT_PATH, &body, RetryPolicy::generation()).await
    }

    /// Upload a class roster (csv, xlsx, xls, or pdf) as the multipart field `file`.
    pub async fn upload_class_records(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, FailureOutcome> {
        validate_required([("fileName", file_name)])?;
        let ext = upload_extension(file_name).ok_or_else(|| {
            FailureOutcome::validation([format!(
                "fileName must end in .csv, .xlsx, .xls or .pdf (got {file_name:?})"
            )])
        })?;
        let part = FormPart::file("file", file_name, bytes).with_mime(mime_for(&ext));
        let request = RequestDescriptor::post(self.config.url_for(UPLOAD_PATH))
            .with_body(Body::Multipart(vec![part]));
        decode(self.call(&request, RetryPolicy::generation()).await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, policy: RetryPolicy) -> Result<T, FailureOutcome>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = Body::json(body)
            .map_err(|e| FailureOutcome::validation([format!("request body is not serializable: {e}")]))?;
        let request = RequestDescriptor::post(self.config.url_for(path)).with_body(body);
        decode(self.call(&request, policy).await?)
    }
}

fn validate_metrics(index: Option<usize>, data: &StudentRiskData) -> Result<(), FailureOutcome> {
    let named: Vec<(String, f64)> = data
        .metrics()
        .into_iter()
        .map(|(name, value)| match index {
            Some(i) => (format!("students[{i}].{name}"), value),
            None => (name.to_string(), value),
        })
        .collect();
    validate_ranges(named.iter().map(|(name, value)| (name.as_str(), *value, METRIC_MIN, METRIC_MAX)))
}

fn mime_for(ext: &str) -> &'static str {
    match ext {
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Decode a successful body into `T`.
fn decode<T: DeserializeOwned>(body: ResponseBody) -> Result<T, FailureOutcome> {
    match body {
        ResponseBody::Json(value) => serde_json::from_value(value)
            .map_err(|e| FailureOutcome::InvalidResponse { details: e.to_string() }),
        ResponseBody::Text(text) => Err(FailureOutcome::InvalidResponse {
            details: format!("expected a JSON body, got text of {} bytes", text.len()),
        }),
        ResponseBody::Empty => {
            Err(FailureOutcome::InvalidResponse { details: "expected a JSON body, got none".into() })
        }
    }
}
