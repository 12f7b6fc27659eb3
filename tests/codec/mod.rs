use std::io;

use error_rail_http::codec::{error_response, success_response, write_fallback, FALLBACK_BODY};
use error_rail_http::{write_error, write_success, CodecError, ErrorKind, ErrorRecord, ResponseEnvelope, ResponseSink};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

fn body_json(response: &Response<Vec<u8>>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn write_error_sets_status_and_envelope() {
    let mut response = Response::new(Vec::new());
    let err = ErrorRecord::new(ErrorKind::NotFound, "user not found");

    write_error(&mut response, &err).unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

    let body = body_json(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "user not found");
}

#[test]
fn write_success_wraps_data() {
    #[derive(Serialize)]
    struct User {
        user_id: u64,
        name: &'static str,
    }

    let mut response = Response::new(Vec::new());
    write_success(&mut response, &User { user_id: 123, name: "John Doe" }).unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(body_json(&response), json!({"success": true, "data": {"user_id": 123, "name": "John Doe"}}));
}

#[test]
fn error_body_decodes_as_envelope() {
    let err = ErrorRecord::validation("bad email").with_details(json!({"field": "email"})).with_request_id("req-5");
    let response = error_response(&err);

    let envelope: ResponseEnvelope<Value> = serde_json::from_slice(response.body()).unwrap();

    assert_eq!(envelope.error(), Some(&err));
}

#[test]
fn custom_kind_is_written_as_500() {
    let response = error_response(&ErrorRecord::new(ErrorKind::custom("PAYMENT_DECLINED"), "declined"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&response)["error"]["code"], "PAYMENT_DECLINED");
}

#[test]
fn fallback_is_plain_text_500() {
    let mut response = Response::new(Vec::new());

    write_fallback(&mut response).unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(response.body(), FALLBACK_BODY.as_bytes());
}

#[test]
fn success_serialization_error_is_returned() {
    let data: std::collections::HashMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();

    let result = success_response(&data);

    assert!(matches!(result, Err(CodecError::Serialize(_))));
}

#[derive(Default)]
struct Recorder {
    headers: Vec<(HeaderName, HeaderValue)>,
    status: Option<StatusCode>,
    body: Vec<u8>,
    fail_writes: bool,
}

impl ResponseSink for Recorder {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.push((name, value));
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"));
        }
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}

#[test]
fn metadata_is_set_before_body() {
    let mut sink = Recorder::default();

    write_error(&mut sink, &ErrorRecord::conflict("taken")).unwrap();

    assert_eq!(sink.status, Some(StatusCode::CONFLICT));
    assert_eq!(sink.headers.len(), 1);
    assert_eq!(sink.headers[0].0, CONTENT_TYPE);
    assert!(!sink.body.is_empty());
}

#[test]
fn sink_write_failure_surfaces_as_io_error() {
    let mut sink = Recorder { fail_writes: true, ..Recorder::default() };

    let result = write_success(&mut sink, &json!({"ok": true}));

    assert!(matches!(result, Err(CodecError::Io(ref err)) if err.kind() == io::ErrorKind::BrokenPipe));
}
