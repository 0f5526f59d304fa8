//! Integration tests for the build endpoint's input handling.
//!
//! Builds that reach the container engine are out of scope here; every
//! request below is rejected before any engine invocation.

mod common;

use axum::http::StatusCode;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_build_without_file_part_is_rejected() {
    let app = common::test_app();

    let request = common::build_request(&[("name", None, b"hello")]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["message"], "No file part");
}

#[tokio::test]
async fn test_build_without_name_is_rejected() {
    let app = common::test_app();

    let request = common::build_request(&[("file", Some("function.zip"), b"fake zip bytes")]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["message"], "Function name is required");
}

#[tokio::test]
async fn test_build_with_empty_name_is_rejected() {
    let app = common::test_app();

    let request = common::build_request(&[
        ("file", Some("function.zip"), b"fake zip bytes"),
        ("name", None, b""),
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_build_with_invalid_name_is_rejected() {
    let app = common::test_app();

    let request = common::build_request(&[
        ("file", Some("function.zip"), b"fake zip bytes"),
        ("name", None, b"Not A Valid Name!"),
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_build_with_corrupt_archive_is_rejected() {
    let app = common::test_app();

    let request = common::build_request(&[
        ("file", Some("function.zip"), b"this is not a zip archive"),
        ("name", None, b"hello-fn"),
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Invalid source archive"));
}

#[tokio::test]
async fn test_build_without_multipart_content_type_is_rejected() {
    let app = common::test_app();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/build")
        .body(axum::body::Body::from("plain body"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    // The multipart extractor rejects the request before the handler runs.
    assert!(response.status().is_client_error());
}
