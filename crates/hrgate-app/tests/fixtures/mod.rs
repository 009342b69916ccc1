//! Test harness: a gateway router wired to a wiremock backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hrgate::AppState;
use hrgate_backend::BackendClient;
use hrgate_chat::{ChatOrchestrator, JobTracker};
use hrgate_store::{MemoryStore, SessionBook};

pub struct Gateway {
    pub backend: MockServer,
    pub router: Router,
    pub sessions: Arc<SessionBook>,
}

/// Build a gateway with an in-memory session store and a mock backend
pub async fn gateway() -> Gateway {
    let backend_server = MockServer::start().await;
    let backend =
        Arc::new(BackendClient::new(&backend_server.uri(), false).expect("mock backend url"));

    let sessions = Arc::new(SessionBook::new(Arc::new(MemoryStore::new())));
    sessions.init().await;

    let state = AppState {
        backend: backend.clone(),
        orchestrator: Arc::new(ChatOrchestrator::new(backend, sessions.clone())),
        tracker: Arc::new(JobTracker::default()),
        sessions: sessions.clone(),
        production: false,
    };

    Gateway {
        backend: backend_server,
        router: hrgate::create_router(state),
        sessions,
    }
}

impl Gateway {
    pub async fn mock_post(&self, endpoint: &str, response: Value) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.backend)
            .await;
    }

    pub async fn mock_post_error(&self, endpoint: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.backend)
            .await;
    }

    pub async fn mock_get(&self, endpoint: &str, response: Value) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.backend)
            .await;
    }

    pub async fn mock_get_bytes(&self, endpoint: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .mount(&self.backend)
            .await;
    }
}

/// JSON request carrying the session cookie
pub fn authed_json(http_method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, "session_token=test-token")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// JSON request without any cookie
pub fn anon_json(http_method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Multipart upload request with a single `file` part
pub fn upload_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "hrgate-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload-pdf")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::COOKIE, "session_token=test-token")
        .body(Body::from(body))
        .expect("request")
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
