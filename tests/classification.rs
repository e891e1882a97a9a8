use pulse_client::{classify_status, is_client_error, is_retryable_status, StatusClass};

#[test]
fn retryable_and_client_error_are_disjoint() {
    for code in 0..=1_000u16 {
        assert!(
            !(is_retryable_status(code) && is_client_error(code)),
            "status {code} classified both ways"
        );
    }
}

#[test]
fn classification_is_stable_across_calls() {
    for code in [200, 204, 400, 404, 408, 422, 429, 500, 501, 503, 504] {
        assert_eq!(classify_status(code), classify_status(code));
        assert_eq!(is_retryable_status(code), is_retryable_status(code));
    }
}

#[test]
fn buckets() {
    assert_eq!(classify_status(201), StatusClass::Success);
    assert_eq!(classify_status(408), StatusClass::Retryable);
    assert_eq!(classify_status(429), StatusClass::Retryable);
    assert_eq!(classify_status(401), StatusClass::ClientError);
    assert_eq!(classify_status(501), StatusClass::Other);
    assert_eq!(classify_status(302), StatusClass::Other);
}
