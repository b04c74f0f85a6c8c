//! Integration tests for webhook signature verification.
//!
//! Signatures are checked against an HMAC computed directly with the
//! `hmac` crate, so these tests do not trust `calculate_signature` to
//! validate itself.

use std::fmt::Write as _;
use std::time::Duration;

use attio::webhooks::{
    calculate_signature, extract_from_headers, is_valid_signature, verify_signature,
    verify_signature_at, SignatureVerificationError, WebhookHandler, WebhookRequest,
    DEFAULT_TOLERANCE,
};
use attio::WebhookSecret;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

const BODY: &str = r#"{"event":"record.created"}"#;
const SECRET: &str = "s3cr3t";
const T: i64 = 1_700_000_000;

fn reference_signature(body: &str, timestamp: i64, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{body}").as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut hex = String::from("v1=");
    for byte in digest {
        write!(hex, "{byte:02x}").unwrap();
    }
    hex
}

// ============================================================================
// Signature computation
// ============================================================================

#[test]
fn test_signature_matches_reference_hmac() {
    assert_eq!(
        calculate_signature(BODY, T, SECRET),
        reference_signature(BODY, T, SECRET)
    );
}

#[test]
fn test_json_payload_signs_compact_form() {
    let value = json!({"event": "record.created"});
    assert_eq!(
        calculate_signature(&value, T, SECRET),
        reference_signature(BODY, T, SECRET)
    );
}

#[test]
fn test_valid_signature_verifies() {
    let signature = reference_signature(BODY, T, SECRET);
    assert_eq!(
        verify_signature_at(T, BODY, &signature, T, SECRET, DEFAULT_TOLERANCE),
        Ok(())
    );
}

#[test]
fn test_wrong_secret_is_mismatch() {
    let signature = reference_signature(BODY, T, "other");
    assert_eq!(
        verify_signature_at(T, BODY, &signature, T, SECRET, DEFAULT_TOLERANCE),
        Err(SignatureVerificationError::SignatureMismatch)
    );
}

#[test]
fn test_tampered_body_is_mismatch() {
    let signature = reference_signature(BODY, T, SECRET);
    assert_eq!(
        verify_signature_at(
            T,
            r#"{"event":"record.deleted"}"#,
            &signature,
            T,
            SECRET,
            DEFAULT_TOLERANCE
        ),
        Err(SignatureVerificationError::SignatureMismatch)
    );
}

// ============================================================================
// Replay window
// ============================================================================

#[test]
fn test_old_timestamp_depends_on_tolerance() {
    let sent_at = T - 400;
    let signature = reference_signature(BODY, sent_at, SECRET);

    assert!(matches!(
        verify_signature_at(T, BODY, &signature, sent_at, SECRET, Duration::from_secs(300)),
        Err(SignatureVerificationError::TimestampTooOld { age: 400, tolerance: 300 })
    ));
    assert_eq!(
        verify_signature_at(T, BODY, &signature, sent_at, SECRET, Duration::from_secs(500)),
        Ok(())
    );
}

#[test]
fn test_window_edges_are_inclusive() {
    let tolerance = Duration::from_secs(300);
    for sent_at in [T - 300, T + 300] {
        let signature = reference_signature(BODY, sent_at, SECRET);
        assert_eq!(
            verify_signature_at(T, BODY, &signature, sent_at, SECRET, tolerance),
            Ok(())
        );
    }
}

#[test]
fn test_future_timestamp_is_rejected() {
    let sent_at = T + 301;
    let signature = reference_signature(BODY, sent_at, SECRET);
    assert!(matches!(
        verify_signature_at(T, BODY, &signature, sent_at, SECRET, DEFAULT_TOLERANCE),
        Err(SignatureVerificationError::TimestampInFuture { skew: 301, .. })
    ));
}

#[test]
fn test_stale_timestamp_reported_before_signature() {
    assert!(matches!(
        verify_signature_at(T, BODY, "v1=deadbeef", T - 1000, SECRET, DEFAULT_TOLERANCE),
        Err(SignatureVerificationError::TimestampTooOld { .. })
    ));
}

#[test]
fn test_current_clock_helpers() {
    let now = chrono::Utc::now().timestamp();
    let signature = reference_signature(BODY, now, SECRET);

    assert!(verify_signature(BODY, &signature, now, SECRET, DEFAULT_TOLERANCE).is_ok());
    assert!(is_valid_signature(BODY, &signature, now, SECRET, DEFAULT_TOLERANCE));
    assert!(!is_valid_signature(BODY, &signature, now, "wrong", DEFAULT_TOLERANCE));
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_empty_inputs_have_specific_errors() {
    assert_eq!(
        verify_signature_at(T, BODY, "", T, SECRET, DEFAULT_TOLERANCE),
        Err(SignatureVerificationError::MissingSignature)
    );
    assert_eq!(
        verify_signature_at(T, BODY, "v1=abc", T, "", DEFAULT_TOLERANCE),
        Err(SignatureVerificationError::MissingSecret)
    );
    assert_eq!(
        SignatureVerificationError::MissingSignature.to_string(),
        "Signature cannot be nil or empty"
    );
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn test_header_name_variants() {
    let signature = reference_signature(BODY, T, SECRET);
    let variants = [
        ("X-Attio-Signature", "X-Attio-Timestamp"),
        ("x-attio-signature", "x-attio-timestamp"),
        ("X_ATTIO_SIGNATURE", "X_ATTIO_TIMESTAMP"),
    ];

    for (signature_name, timestamp_name) in variants {
        let headers = vec![
            (signature_name.to_string(), signature.clone()),
            (timestamp_name.to_string(), T.to_string()),
        ];
        let extracted = extract_from_headers(headers).unwrap();
        assert_eq!(extracted.signature, signature);
        assert_eq!(extracted.timestamp, T);
    }
}

#[test]
fn test_missing_headers_are_named() {
    assert_eq!(
        extract_from_headers([("x-attio-timestamp", "1")]),
        Err(SignatureVerificationError::MissingHeader {
            header: "X-Attio-Signature"
        })
    );
    assert_eq!(
        extract_from_headers([("x-attio-signature", "v1=abc")]),
        Err(SignatureVerificationError::MissingHeader {
            header: "X-Attio-Timestamp"
        })
    );
}

#[test]
fn test_combined_signature_header() {
    let signature = reference_signature(BODY, T, SECRET);
    let hex = signature.trim_start_matches("v1=");
    let combined = format!("t={T},v1={hex}");

    let extracted = extract_from_headers([("X-Attio-Signature", combined.as_str())]).unwrap();
    assert_eq!(extracted.timestamp, T);
    assert_eq!(extracted.signature, signature);
}

#[test]
fn test_handler_verifies_and_decodes_delivery() {
    let now = chrono::Utc::now().timestamp();
    let body = json!({
        "webhook_id": "wh_1",
        "events": [{
            "event_type": "record.updated",
            "id": {"workspace_id": "ws_1", "object_id": "obj_1", "record_id": "rec_1"},
            "actor": {"type": "workspace-member", "id": "wm_1"},
            "attribute_id": "attr_1"
        }]
    })
    .to_string();
    let request = WebhookRequest::new(body.as_str())
        .with_header("X-Attio-Signature", reference_signature(&body, now, SECRET))
        .with_header("X-Attio-Timestamp", now.to_string());

    let handler = WebhookHandler::new(WebhookSecret::new(SECRET).unwrap());
    let delivery = handler.parse_events(&request).unwrap();

    assert_eq!(delivery.webhook_id, "wh_1");
    assert_eq!(delivery.events.len(), 1);
    let event = &delivery.events[0];
    assert_eq!(event.event_type, "record.updated");
    assert_eq!(event.id["record_id"], "rec_1");
    assert_eq!(event.extra.get("attribute_id"), Some(&json!("attr_1")));
}

#[test]
fn test_handler_rejects_forged_delivery() {
    let now = chrono::Utc::now().timestamp();
    let request = WebhookRequest::new(BODY)
        .with_header("X-Attio-Signature", reference_signature(BODY, now, "forged"))
        .with_header("X-Attio-Timestamp", now.to_string());

    let handler = WebhookHandler::new(WebhookSecret::new(SECRET).unwrap());
    assert_eq!(
        handler.parse_and_verify(&request).unwrap_err(),
        SignatureVerificationError::SignatureMismatch
    );
}

#[test]
fn test_handler_rejects_signed_body_that_is_not_json() {
    let now = chrono::Utc::now().timestamp();
    let request = WebhookRequest::new("not json")
        .with_header("X-Attio-Signature", reference_signature("not json", now, SECRET))
        .with_header("X-Attio-Timestamp", now.to_string());

    let handler = WebhookHandler::new(WebhookSecret::new(SECRET).unwrap());
    assert!(matches!(
        handler.parse_and_verify(&request),
        Err(SignatureVerificationError::InvalidJson { .. })
    ));
}
