mod common;

use common::test_helpers::{client, json, status, Step};
use pulse_client::{
    Body, ChatMessage, ChatRequest, FailureOutcome, LearningPathRequest, Method, RawResponse,
    RequestDescriptor, RetryPolicy, RiskLevel, StudentInsightData, StudentRiskData,
};
use serde_json::json as body;

fn sent_json(request: &RequestDescriptor) -> serde_json::Value {
    match request.body() {
        Body::Json(value) => value.clone(),
        other => panic!("expected JSON body, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_trims_history_and_decodes_reply() {
    let (client, h) = client(vec![json(200, body!({"response": "Try fractions first."}))]);
    let history = (0..15).map(|i| ChatMessage::user(format!("turn {i}"))).collect();
    let reply = client
        .chat(ChatRequest::new("help with math").with_history(history).with_user_id("stu-1"))
        .await
        .unwrap();
    assert_eq!(reply.response, "Try fractions first.");

    let sent = &h.transport.requests()[0];
    assert_eq!(sent.method(), Method::Post);
    assert_eq!(sent.url(), "http://backend/api/chat");
    assert_eq!(sent.effective_headers()["content-type"], "application/json");
    let payload = sent_json(sent);
    assert_eq!(payload["history"].as_array().unwrap().len(), 10);
    assert_eq!(payload["history"][0]["content"], "turn 5");
    assert_eq!(payload["userId"], "stu-1");
}

#[tokio::test]
async fn chat_requires_message() {
    let (client, h) = client(vec![status(200)]);
    let err = client.chat(ChatRequest::new("")).await.unwrap_err();
    assert_eq!(err.validation_details().unwrap(), &["message is required"]);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn predict_risk_retries_then_decodes() {
    let (client, h) = client(vec![
        status(502),
        json(200, body!({"riskLevel": "High", "confidence": 0.91, "analysis": {"labels": ["at risk"], "scores": [0.91]}})),
    ]);
    let prediction = client
        .predict_risk(StudentRiskData {
            engagement_score: 20.0,
            avg_quiz_score: 35.0,
            attendance: 50.0,
            assignment_completion: 30.0,
        })
        .await
        .unwrap();
    assert_eq!(prediction.risk_level, RiskLevel::High);
    assert_eq!(h.transport.calls(), 2);
    assert_eq!(sent_json(&h.transport.requests()[0])["avgQuizScore"], 35.0);
}

#[tokio::test]
async fn batch_prediction_validates_each_student() {
    let (client, h) = client(vec![json(200, body!([]))]);
    let ok = StudentRiskData { engagement_score: 1.0, avg_quiz_score: 2.0, attendance: 3.0, assignment_completion: 4.0 };
    let bad = StudentRiskData { attendance: 101.0, ..ok };
    let err = client.predict_risk_batch(vec![ok, bad]).await.unwrap_err();
    assert_eq!(
        err.validation_details().unwrap(),
        &["students[1].attendance must be between 0 and 100 (got 101)"]
    );
    assert_eq!(h.transport.calls(), 0);

    let results = client.predict_risk_batch(vec![ok]).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(sent_json(&h.transport.requests()[0])["students"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_batch_is_sent_and_decodes_to_empty() {
    let (client, h) = client(vec![json(200, body!([]))]);
    let results = client.predict_risk_batch(vec![]).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(h.transport.calls(), 1);
    let requests = h.transport.requests();
    assert_eq!(requests[0].url(), "http://backend/api/predict-risk/batch");
    assert_eq!(sent_json(&requests[0])["students"], body!([]));
}

#[tokio::test]
async fn learning_path_round_trip() {
    let (client, h) = client(vec![json(200, body!({"learningPath": "Week 1: ..."}))]);
    let response = client
        .learning_path(LearningPathRequest {
            weaknesses: vec!["fractions".into()],
            grade_level: "Grade 5".into(),
            learning_style: Some("visual".into()),
        })
        .await
        .unwrap();
    assert_eq!(response.learning_path, "Week 1: ...");
    assert_eq!(sent_json(&h.transport.requests()[0])["gradeLevel"], "Grade 5");
}

#[tokio::test]
async fn daily_insight_requires_names() {
    let (client, h) = client(vec![json(200, body!({"insight": "Attendance dipped."}))]);
    let student = |name: &str| StudentInsightData {
        name: name.into(),
        engagement_score: 60.0,
        avg_quiz_score: 70.0,
        attendance: 80.0,
        risk_level: RiskLevel::Low,
    };
    let err = client.daily_insight(vec![student("Ana"), student("")]).await.unwrap_err();
    assert_eq!(err.validation_details().unwrap(), &["students[1].name is required"]);
    assert_eq!(h.transport.calls(), 0);

    let insight = client.daily_insight(vec![student("Ana")]).await.unwrap();
    assert_eq!(insight.insight, "Attendance dipped.");
}

#[tokio::test]
async fn upload_sends_multipart_without_content_type() {
    let (client, h) = client(vec![json(
        200,
        body!({"success": true, "students": [{"name": "Ana"}], "columnMapping": {"Student": "name"}, "totalRows": 1}),
    )]);
    let response = client.upload_class_records("roster.csv", b"Student\nAna\n".to_vec()).await.unwrap();
    assert!(response.success);
    assert_eq!(response.total_rows, 1);

    let sent = &h.transport.requests()[0];
    assert_eq!(sent.url(), "http://backend/api/upload/class-records");
    assert!(!sent.effective_headers().contains_key("content-type"));
    match sent.body() {
        Body::Multipart(parts) => {
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].name, "file");
            assert_eq!(parts[0].file_name.as_deref(), Some("roster.csv"));
            assert_eq!(parts[0].mime.as_deref(), Some("text/csv"));
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response_without_retry() {
    let (client, h) = client(vec![Step::Respond(RawResponse::new(200).with_body("<html>oops</html>"))]);
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, FailureOutcome::InvalidResponse { .. }));
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test]
async fn health_decodes_models() {
    let (client, _) = client(vec![json(200, body!({"status": "healthy", "models": {"chat": "qwen"}}))]);
    let health = client.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.models["chat"], "qwen");
}

#[tokio::test]
async fn http_failure_carries_remote_request_id() {
    let (client, _) = client(vec![Step::Respond(
        RawResponse::new(401).with_header("X-Request-Id", "req-42").with_body("{\"detail\":\"bad token\"}"),
    )]);
    let err = client
        .call(&RequestDescriptor::get("http://backend/api/private"), RetryPolicy::default())
        .await
        .unwrap_err();
    assert_eq!(err.request_id(), Some("req-42"));
    assert!(err.to_string().contains("bad token"));
}
