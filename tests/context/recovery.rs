use error_rail_http::codec::ResponseSink;
use error_rail_http::context::{get_request_id, with_request_id, RequestContext};
use error_rail_http::recovery::{panic_record, recover, respond_to_panic, PANIC_ERROR_CODE};
use error_rail_http::{write_success, ErrorRecord, Priority};
use http::{Response, StatusCode};
use serde_json::{json, Value};

fn body_json(response: &Response<Vec<u8>>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn panic_becomes_internal_error() {
    let mut response = Response::new(Vec::new());

    let panicked = recover(&mut response, |_| panic!("Test panic"));

    assert!(panicked);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");
    assert_eq!(body["error"]["module"], "middleware");
    assert!(body["error"]["details"].as_str().unwrap().contains("Test panic"));
}

#[test]
fn formatted_panic_payload_is_reported() {
    let mut response = Response::new(Vec::new());
    let index = 7;

    recover(&mut response, |_| panic!("index {index} out of range"));

    assert_eq!(body_json(&response)["error"]["details"], "Panic recovered: index 7 out of range");
}

#[test]
fn non_string_payload_gets_placeholder_details() {
    let mut response = Response::new(Vec::new());

    let panicked = recover(&mut response, |_| std::panic::panic_any(42_i32));

    assert!(panicked);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&response)["error"]["details"], "Panic recovered: non-string panic payload");
}

#[test]
fn normal_return_passes_through() {
    let mut response = Response::new(Vec::new());

    let panicked = recover(&mut response, |sink| {
        write_success(sink, &json!({"id": 1})).unwrap();
    });

    assert!(!panicked);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response), json!({"success": true, "data": {"id": 1}}));
}

#[test]
fn partial_output_is_replaced() {
    let mut response = Response::new(Vec::new());

    recover(&mut response, |sink| {
        sink.set_status(StatusCode::OK);
        sink.write_body(b"{\"partial\":").unwrap();
        panic!("half way");
    });

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&response)["error"]["code"], "INTERNAL_ERROR");
}

#[test]
fn panic_record_is_flagged_critical_system_error() {
    let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));

    let record = panic_record(&*payload, None);

    assert_eq!(record.priority(), Some(Priority::Critical));
    assert_eq!(record.error_code(), Some(PANIC_ERROR_CODE));
    assert_eq!(record.user_id(), Some("system"));
    assert_eq!(record.details(), Some(&json!("Panic recovered: boom")));
}

#[test]
fn request_id_from_context_reaches_panic_record() {
    let mut response = Response::new(Vec::new());

    let request_id = with_request_id(&RequestContext::new(), |ctx| {
        let id = get_request_id(ctx).to_owned();
        if let Err(payload) = std::panic::catch_unwind(|| panic!("inner failure")) {
            respond_to_panic(&mut response, &*payload, Some(&id));
        }
        id
    });

    let envelope: error_rail_http::ResponseEnvelope<Value> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(envelope.error().and_then(ErrorRecord::request_id), Some(request_id.as_str()));
}
