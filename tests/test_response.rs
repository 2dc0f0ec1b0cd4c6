use httpfromtcp::http::connection::HandlerError;
use httpfromtcp::http::response::{StatusCode, default_headers, default_trailers};
use httpfromtcp::http::writer::{ResponseWriter, WriteError, WriterState};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::Other(418).as_u16(), 418);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
    assert_eq!(StatusCode::Other(201).reason_phrase(), "Unknown Status Code");
}

#[test]
fn test_status_code_from_u16() {
    assert_eq!(StatusCode::from_u16(200), StatusCode::Ok);
    assert_eq!(StatusCode::from(400), StatusCode::BadRequest);
    assert_eq!(StatusCode::from_u16(500), StatusCode::InternalServerError);
    assert_eq!(StatusCode::from_u16(404), StatusCode::Other(404));
}

#[test]
fn test_default_headers() {
    let headers = default_headers(42);

    assert_eq!(headers.get("content-length"), Some("42"));
    assert_eq!(headers.get("connection"), Some("close"));
    assert_eq!(headers.get("content-type"), Some("text/plain"));
    assert_eq!(headers.len(), 3);
}

#[test]
fn test_default_trailers_are_empty() {
    assert!(default_trailers().is_empty());
}

#[tokio::test]
async fn test_handler_error_writes_full_response() {
    let mut writer = ResponseWriter::new(Vec::new());
    HandlerError::bad_request("oops")
        .write_to(&mut writer)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "HTTP/1.1 400 Bad Request\r\ncontent-length: 4\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\noops"
    );
}

#[test]
fn test_handler_error_display() {
    let err = HandlerError::internal("disk full");
    assert_eq!(err.to_string(), "500 Internal Server Error: disk full");
}

#[test]
fn test_handler_error_from_write_error() {
    let err: HandlerError = WriteError::OutOfOrder {
        expected: WriterState::WritingBody,
        actual: WriterState::WritingStatus,
    }
    .into();

    assert_eq!(err.status, StatusCode::InternalServerError);
    assert!(err.message.contains("out of order"));
}
