mod common;

use common::test_helpers::{client, harness, status, Step};
use pulse_client::{with_fallback, Level, RequestDescriptor, RetryPolicy, RiskLevel, StudentRiskData};
use std::time::Duration;

#[tokio::test]
async fn fallback_never_rejects_after_retry_exhaustion() {
    let h = harness(vec![status(503)]);
    let request = RequestDescriptor::get("http://backend/health");
    let policy = RetryPolicy::default().with_max_retries(2).with_base_backoff(Duration::from_millis(10));

    let result =
        with_fallback(|| async { h.executor.execute(&request, policy).await.map(Some) }, None).await;

    assert!(result.from_fallback);
    assert_eq!(result.data, None);
    assert_eq!(h.transport.calls(), 3);
}

#[tokio::test]
async fn fallback_passes_success_through() {
    let h = harness(vec![status(204)]);
    let request = RequestDescriptor::get("http://backend/health");
    let result = with_fallback(
        || async { h.executor.execute(&request, RetryPolicy::none()).await.map(Some) },
        None,
    )
    .await;
    assert!(!result.from_fallback);
    assert!(result.data.is_some());
}

#[tokio::test]
async fn risk_prediction_degrades_to_neutral_default() {
    let (client, h) = client(vec![Step::Fail("connection refused")]);
    let data = StudentRiskData {
        engagement_score: 40.0,
        avg_quiz_score: 55.0,
        attendance: 60.0,
        assignment_completion: 50.0,
    };
    let result = client.predict_risk_or_default(data).await;
    assert!(result.from_fallback);
    assert_eq!(result.data.risk_level, RiskLevel::Medium);
    assert_eq!(result.data.confidence, 0.0);
    assert_eq!(h.transport.calls(), 1 + RetryPolicy::interactive().max_retries as usize);
    let errors = h.logger.at_level(Level::Error);
    let record = errors
        .iter()
        .find(|r| r.message.contains("using fallback value"))
        .expect("fallback record");
    assert_eq!(record.endpoint, "/api/predict-risk");
    assert_eq!(record.method, "POST");
}
