use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock HR backend for exercising the relay client
pub struct HrMockServer {
    server: MockServer,
}

impl HrMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Mock a successful chat answer
    pub async fn mock_chat_success(&self, message: &str, answer: &str) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({ "message": message })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": answer
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a FastAPI-style error with a `detail` field
    pub async fn mock_detail_error(&self, route: &str, status: u16, detail: &str) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "detail": detail
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a successful OTP verification carrying a session token
    pub async fn mock_verify_otp(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": token,
                "user": { "email": "someone@example.com" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock the async upload endpoint
    pub async fn mock_upload(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/gemini/upload-gemini-async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a job status response
    pub async fn mock_job_status(&self, job_id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/gemini/status/{}", job_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a document submission response
    pub async fn mock_submit_document(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/document-requests/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock the employee suggestions lookup
    pub async fn mock_employee_suggestions(&self, query: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/certificates/employee-suggestions/{}", query)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
