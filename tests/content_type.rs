#![allow(missing_docs)]

use bytes::Bytes;
use futures::stream;
use uploadgear::{memory_buffer, parser::extract_multipart_boundary, UploadError};

fn boundary_error(content_type: &str) -> String {
    extract_multipart_boundary(content_type)
        .expect_err("content type should be rejected")
        .message()
        .to_owned()
}

#[test]
fn accepts_boundaries_within_the_allowed_alphabet() {
    let cases = [
        ("multipart/form-data; boundary=abc123", "abc123"),
        ("multipart/form-data; boundary=\"a'b(c)+d_e,f-g.h/i:j=k?l\"", "a'b(c)+d_e,f-g.h/i:j=k?l"),
        ("multipart/form-data; charset=utf-8; boundary=----x", "----x"),
        ("MULTIPART/FORM-DATA; boundary=X", "X"),
    ];
    for (content_type, expected) in cases {
        assert_eq!(
            extract_multipart_boundary(content_type).as_deref(),
            Ok(expected),
            "{content_type}"
        );
    }
}

#[test]
fn boundary_length_limit_is_inclusive() {
    let at_limit = "b".repeat(70);
    assert_eq!(
        extract_multipart_boundary(&format!("multipart/form-data; boundary={at_limit}")),
        Ok(at_limit)
    );

    let over = "b".repeat(71);
    assert_eq!(
        boundary_error(&format!("multipart/form-data; boundary={over}")),
        "multipart boundary cannot exceed 70 characters"
    );
}

#[test]
fn reports_why_a_content_type_is_rejected() {
    assert_eq!(boundary_error("not a content type"), "invalid Content-Type header");
    assert_eq!(
        boundary_error("multipart/mixed; boundary=abc"),
        "Content-Type must be multipart/form-data"
    );
    assert_eq!(
        boundary_error("multipart/form-data"),
        "missing multipart boundary parameter"
    );
    assert_eq!(
        boundary_error("multipart/form-data; boundary=\"abc@123\""),
        "multipart boundary contains invalid characters"
    );
}

#[tokio::test]
async fn request_with_bad_content_type_fails_before_reading_the_body() {
    let body = stream::iter([Ok::<Bytes, UploadError>(Bytes::from_static(
        b"--abc\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\nv\r\n--abc--\r\n",
    ))]);
    let err = memory_buffer()
        .parse_request("application/json", body)
        .await
        .expect_err("json is not multipart");
    assert!(
        matches!(&err, UploadError::Parse(parse) if parse.message() == "Content-Type must be multipart/form-data"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn request_reads_boundary_from_content_type() {
    let body = stream::iter([Ok::<Bytes, UploadError>(Bytes::from_static(
        b"--abc\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\nv\r\n--abc--\r\n",
    ))]);
    let output = memory_buffer()
        .parse_request("multipart/form-data; boundary=abc", body)
        .await
        .expect("request should parse");
    assert_eq!(output.text_fields, vec![("n".to_owned(), "v".to_owned())]);
}
