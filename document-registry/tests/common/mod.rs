#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use document_registry::config::UploadConfig;
use document_registry::services::InMemoryDocumentStore;
use document_registry::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "----document-registry-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryDocumentStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(UploadConfig::default().max_upload_bytes)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = AppState::new(store.clone(), UploadConfig { max_upload_bytes });

        TestApp {
            router: build_router(state),
            store,
        }
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes()
            .to_vec();
        (status, headers, bytes)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let (status, _, bytes) = self.send_raw(request).await;
        (status, bytes)
    }

    pub async fn download(&self, id: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        self.send_raw(
            Request::builder()
                .uri(format!("/{}/download", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = self.send(request).await;
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse JSON")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send_json(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send_json(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send_json(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn upload(&self, form: MultipartForm) -> (StatusCode, serde_json::Value) {
        self.send_json(form.into_request("/upload")).await
    }

    /// Uploads a valid file and returns the created record's id.
    pub async fn upload_ok(
        &self,
        file_name: &str,
        mime: &str,
        data: Vec<u8>,
        department: &str,
    ) -> String {
        let form = MultipartForm::new()
            .file("file", file_name, mime, data)
            .text("uploader", "alice")
            .text("department", department);

        let (status, body) = self.upload(form).await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
        body["id"].as_str().expect("id in response").to_string()
    }
}

/// Hand-rolled `multipart/form-data` body for driving the router in-process.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, mime: &str, data: Vec<u8>) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
