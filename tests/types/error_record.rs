use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone};
use error_rail_http::trace::{NoopIntrospector, RawFrame, StackIntrospector, TraceConfig, UNKNOWN_MODULE};
use error_rail_http::{ErrorKind, ErrorRecord, ErrorType, Priority};
use serde_json::json;

fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

struct Frames(Vec<RawFrame>);

impl StackIntrospector for Frames {
    fn frames(&self) -> Vec<RawFrame> {
        self.0.clone()
    }
}

#[test]
fn new_captures_caller_module() {
    let before = unix_now();
    let err = ErrorRecord::new(ErrorKind::NotFound, "user not found");
    let after = unix_now();

    assert_eq!(err.kind(), &ErrorKind::NotFound);
    assert_eq!(err.message(), "user not found");
    assert!(err.timestamp() >= before && err.timestamp() <= after);

    let trace = err.trace().expect("trace should be captured");
    assert!(!trace.is_empty());
    assert!(trace[0].contains("new_captures_caller_module"), "unexpected first frame: {}", trace[0]);
    assert_eq!(err.module(), Some("new_captures_caller_module"));
}

#[test]
fn human_readable_time_matches_timestamp() {
    let err = ErrorRecord::internal("db down");

    let expected = Local.timestamp_opt(err.timestamp(), 0).single().unwrap().format("%Y-%m-%d %H:%M:%S").to_string();
    assert_eq!(err.human_readable_time(), Some(expected.as_str()));

    let encoded = serde_json::to_value(&err).unwrap();
    assert_eq!(encoded["human_readable_time"], expected);
}

#[test]
fn shorthand_constructors_skip_their_own_frames() {
    let err = ErrorRecord::conflict("already exists");

    assert_eq!(err.kind(), &ErrorKind::Conflict);
    assert_eq!(err.module(), Some("shorthand_constructors_skip_their_own_frames"));
}

#[test]
fn empty_message_uses_kind_default() {
    let err = ErrorRecord::new(ErrorKind::TooManyRequests, "");

    assert_eq!(err.message(), "Too many requests");
}

#[test]
fn builders_chain() {
    let err = ErrorRecord::validation("invalid input")
        .with_module("user-service")
        .with_details(json!({"field": "email", "reason": "format"}))
        .with_request_id("req-123")
        .with_priority(Priority::High)
        .user_error()
        .with_error_code("US042")
        .with_user_id("u-7");

    assert_eq!(err.module(), Some("user-service"));
    assert_eq!(err.details(), Some(&json!({"field": "email", "reason": "format"})));
    assert_eq!(err.request_id(), Some("req-123"));
    assert_eq!(err.priority(), Some(Priority::High));
    assert_eq!(err.error_type(), Some(ErrorType::User));
    assert_eq!(err.error_code(), Some("US042"));
    assert_eq!(err.user_id(), Some("u-7"));
}

#[test]
fn critical_and_system_error_shortcuts() {
    let err = ErrorRecord::internal("db down").critical().system_error();

    assert_eq!(err.priority(), Some(Priority::Critical));
    assert_eq!(err.error_type(), Some(ErrorType::System));
}

#[test]
fn without_trace_is_not_resurrected_by_later_builders() {
    let err = ErrorRecord::internal("boom")
        .without_trace()
        .with_module("jobs")
        .with_details("retry later")
        .with_request_id("req-1")
        .critical();

    assert_eq!(err.trace(), None);

    let encoded = serde_json::to_value(&err).unwrap();
    assert!(encoded.get("trace").is_none());
}

#[test]
fn render_message_uses_code_and_message() {
    let err = ErrorRecord::unauthorized("token expired");

    assert_eq!(err.render_message(), "[UNAUTHORIZED] token expired");
    assert_eq!(err.to_string(), err.render_message());
}

#[test]
fn status_code_follows_kind() {
    assert_eq!(ErrorRecord::not_found("x").status_code(), 404);
    assert_eq!(ErrorRecord::forbidden("x").status_code(), 403);
    assert_eq!(ErrorRecord::service_unavailable("x").status_code(), 503);
    assert_eq!(ErrorRecord::new(ErrorKind::custom("PAYMENT_DECLINED"), "x").status_code(), 500);
}

#[test]
fn serde_round_trip_preserves_fields() {
    let err = ErrorRecord::bad_request("missing field")
        .with_module("orders")
        .with_details(json!({"field": "quantity"}))
        .with_request_id("req-77");

    let encoded = serde_json::to_string(&err).unwrap();
    let decoded: ErrorRecord = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, err);
    assert_eq!(decoded.kind(), &ErrorKind::BadRequest);
    assert_eq!(decoded.message(), "missing field");
    assert_eq!(decoded.module(), Some("orders"));
    assert_eq!(decoded.details(), Some(&json!({"field": "quantity"})));
    assert_eq!(decoded.request_id(), Some("req-77"));
}

#[test]
fn omitted_optional_fields_decode_as_absent() {
    let decoded: ErrorRecord =
        serde_json::from_value(json!({"code": "FORBIDDEN", "message": "nope", "timestamp": 1_700_000_000}))
            .unwrap();

    assert_eq!(decoded.kind(), &ErrorKind::Forbidden);
    assert_eq!(decoded.timestamp(), 1_700_000_000);
    assert_eq!(decoded.human_readable_time(), None);
    assert_eq!(decoded.module(), None);
    assert_eq!(decoded.trace(), None);
    assert_eq!(decoded.details(), None);
    assert_eq!(decoded.request_id(), None);
    assert_eq!(decoded.priority(), None);
}

#[test]
fn wire_shape_uses_contract_field_names() {
    let err = ErrorRecord::not_found("missing").without_trace().with_module("users").critical().system_error();

    let encoded = serde_json::to_value(&err).unwrap();

    assert_eq!(encoded["code"], "NOT_FOUND");
    assert_eq!(encoded["message"], "missing");
    assert_eq!(encoded["module"], "users");
    assert_eq!(encoded["priority"], "critical");
    assert_eq!(encoded["error_type"], "system");
    assert!(encoded.get("details").is_none());
    assert!(encoded.get("request_id").is_none());
    assert!(encoded.get("user_id").is_none());
}

#[test]
fn custom_kinds_round_trip() {
    let err = ErrorRecord::new(ErrorKind::custom("PAYMENT_DECLINED"), "card declined").without_trace();

    let encoded = serde_json::to_value(&err).unwrap();
    assert_eq!(encoded["code"], "PAYMENT_DECLINED");

    let decoded: ErrorRecord = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded.kind(), &ErrorKind::Custom("PAYMENT_DECLINED".to_string()));
}

#[test]
fn noop_introspector_degrades_to_unknown_module() {
    let err = ErrorRecord::new_with(ErrorKind::Internal, "boom", &NoopIntrospector, &TraceConfig::default());

    assert_eq!(err.trace(), None);
    assert_eq!(err.module(), Some(UNKNOWN_MODULE));
}

#[test]
fn explicit_introspector_and_config() {
    let frames = Frames(vec![
        RawFrame::new("std::rt::lang_start").at("rt.rs", 1),
        RawFrame::new("billing::invoices::charge").at("src/invoices.rs", 88),
        RawFrame::new("billing::main").at("src/main.rs", 3),
    ]);
    let config = TraceConfig::default().with_max_depth(1);

    let err = ErrorRecord::new_with(ErrorKind::Conflict, "already charged", &frames, &config);

    assert_eq!(err.module(), Some("charge"));
    assert_eq!(err.trace(), Some(&["src/invoices.rs:88 billing::invoices::charge".to_string()][..]));
}
