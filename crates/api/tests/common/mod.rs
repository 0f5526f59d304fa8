//! Common test utilities for integration tests.
//!
//! These tests exercise the router directly with `tower::ServiceExt`;
//! nothing here needs a container engine or a registry.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use function_builder_api::app::create_app;
use function_builder_api::config::{
    Config, LoggingConfig, RegistryConfig, RuntimesConfig, ServerConfig,
};
use function_builder_api::middleware::init_metrics;

/// Configuration for tests: default values, scaffold root pointed at a
/// directory that does not exist (no build test reaches the scaffold).
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8082,
            request_timeout_secs: 30,
            max_upload_bytes: 1024 * 1024,
        },
        registry: RegistryConfig {
            url: "localhost:5001".to_string(),
            push_url: None,
        },
        runtimes: RuntimesConfig {
            scaffold_root: PathBuf::from("/nonexistent/runtimes"),
            default_runtime: domain::models::Runtime::PythonFlask,
        },
        logging: LoggingConfig {
            level: "error".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Builds the application router for tests.
pub fn test_app() -> Router {
    init_metrics();
    create_app(test_config())
}

/// Multipart form boundary used by the test helpers.
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Builds a multipart/form-data body from (field name, optional filename,
/// contents) triples.
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, contents) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Builds a POST /build request from multipart parts.
pub fn build_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/build")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
