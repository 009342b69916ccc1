use anyhow::{Context, Result};
use reqwest::multipart;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::BackendError;
use crate::request_log;
use hrgate_types::SESSION_COOKIE;

/// Employee record in the shape the certificates router expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub full_name: String,
    pub employee_code: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub joining_date: String,
}

/// Payload for POST /document-requests/submit
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRequest {
    pub document_type: String,
    pub document_name: String,
    pub user_id: String,
    /// JSON-encoded form details, stringified the way the backend expects
    pub details: String,
}

/// Accepted document submission
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSubmission {
    pub request_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw status payload from GET /gemini/status/{job_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusPayload {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP client for the HR FastAPI backend.
///
/// Every method maps one upstream endpoint; response triage is uniform:
/// non-2xx becomes `BackendError::Upstream` with the best available message,
/// transport failures become `Unreachable`, and 2xx bodies that do not match
/// the expected shape become `InvalidResponse`.
pub struct BackendClient {
    base: Url,
    http: reqwest::Client,
    verbose: bool,
}

impl BackendClient {
    pub fn new(base_url: &str, verbose: bool) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
            verbose,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Backend-absolute download URL for a generated document
    pub fn document_download_url(&self, request_id: &str) -> String {
        format!("{}/document-requests/download/{}", self.base_url(), request_id)
    }

    /// Backend-absolute preview URL for a generated document
    pub fn document_preview_url(&self, request_id: &str) -> String {
        format!("{}/document-requests/preview/{}", self.base_url(), request_id)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidResponse("backend URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn a non-2xx response into an Upstream error, otherwise pass through
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        if self.verbose {
            if let Err(e) =
                request_log::log_exchange_to_file("upstream-error", &url, status.as_u16(), &body)
            {
                eprintln!("Failed to write relay log: {}", e);
            }
        }
        Err(BackendError::from_upstream(status.as_u16(), &body))
    }

    /// Read a 2xx response as a JSON object
    async fn json_object(&self, response: reqwest::Response) -> Result<Value, BackendError> {
        let value: Value = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidResponse("body is not JSON".into()))?;
        if !value.is_object() {
            return Err(BackendError::InvalidResponse("body is not an object".into()));
        }
        Ok(value)
    }

    async fn post_json(&self, segments: &[&str], body: &Value) -> Result<Value, BackendError> {
        let url = self.url(segments)?;
        request_log::log_relay("POST", url.as_str(), Some(body), self.verbose);
        let response = self.http.post(url).json(body).send().await?;
        let response = self.check(response).await?;
        self.json_object(response).await
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, BackendError> {
        let url = self.url(segments)?;
        request_log::log_relay("GET", url.as_str(), None, self.verbose);
        let response = self.http.get(url).send().await?;
        let response = self.check(response).await?;
        self.json_object(response).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn send_otp(&self, email: &str) -> Result<Value, BackendError> {
        self.post_json(&["auth", "send-otp"], &json!({ "email": email }))
            .await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Value, BackendError> {
        self.post_json(&["auth", "verify-otp"], &json!({ "email": email, "otp": otp }))
            .await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<Value, BackendError> {
        self.post_json(&["auth", "resend-otp"], &json!({ "email": email }))
            .await
    }

    /// GET /auth/me with the session token forwarded as a cookie header
    pub async fn me(&self, token: &str) -> Result<Value, BackendError> {
        let url = self.url(&["auth", "me"])?;
        request_log::log_relay("GET", url.as_str(), None, self.verbose);
        let response = self
            .http
            .get(url)
            .header("Cookie", format!("{}={}", SESSION_COOKIE, token))
            .send()
            .await?;
        let response = self.check(response).await?;
        self.json_object(response).await
    }

    /// Best-effort logout notification; callers are expected to ignore errors
    pub async fn notify_logout(&self) -> Result<(), BackendError> {
        let url = self.url(&["auth", "logout"])?;
        request_log::log_relay("POST", url.as_str(), None, self.verbose);
        let response = self.http.post(url).send().await?;
        self.check(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// POST /chat, returning the answer text (empty when the backend omits it)
    pub async fn chat(&self, message: &str) -> Result<String, BackendError> {
        let data = self
            .post_json(&["chat"], &json!({ "message": message }))
            .await?;
        Ok(data
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    // ------------------------------------------------------------------
    // PDF summarization jobs
    // ------------------------------------------------------------------

    /// Upload a PDF for async summarization, returning the backend job id
    pub async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let url = self.url(&["gemini", "upload-gemini-async"])?;
        request_log::log_relay("POST", url.as_str(), None, self.verbose);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|_| BackendError::InvalidResponse("invalid upload mime type".into()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self.http.post(url).multipart(form).send().await?;
        let response = self.check(response).await?;
        let data = self.json_object(response).await?;

        data.get("job_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| BackendError::InvalidResponse("missing job ID".into()))
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusPayload, BackendError> {
        let data = self.get_json(&["gemini", "status", job_id]).await?;
        serde_json::from_value(data)
            .map_err(|_| BackendError::InvalidResponse("unrecognized status payload".into()))
    }

    /// Render a completed summary back into a downloadable PDF
    pub async fn download_summary_pdf(
        &self,
        summary_data: &Value,
        original_filename: &str,
    ) -> Result<Vec<u8>, BackendError> {
        let url = self.url(&["gemini", "download-summary-pdf"])?;
        request_log::log_relay("POST", url.as_str(), None, self.verbose);
        let body = json!({
            "summary_data": summary_data,
            "original_filename": original_filename,
        });
        let response = self.http.post(url).json(&body).send().await?;
        let response = self.check(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(BackendError::InvalidResponse("generated PDF is empty".into()));
        }
        Ok(bytes.to_vec())
    }

    // ------------------------------------------------------------------
    // Certificates and document requests
    // ------------------------------------------------------------------

    pub async fn employee_suggestions(&self, query: &str) -> Result<Value, BackendError> {
        self.get_json(&["certificates", "employee-suggestions", query])
            .await
    }

    pub async fn validate_employee(&self, record: &EmployeeRecord) -> Result<Value, BackendError> {
        let body = serde_json::to_value(record)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        self.post_json(&["certificates", "validate-employee"], &body)
            .await
    }

    pub async fn submit_document_request(
        &self,
        request: &DocumentRequest,
    ) -> Result<DocumentSubmission, BackendError> {
        let body = serde_json::to_value(request)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        let data = self.post_json(&["document-requests", "submit"], &body).await?;
        if data.get("request_id").and_then(|v| v.as_str()).is_none() {
            return Err(BackendError::InvalidResponse("missing request ID".into()));
        }
        serde_json::from_value(data)
            .map_err(|_| BackendError::InvalidResponse("unrecognized submission payload".into()))
    }

    pub async fn download_document(&self, request_id: &str) -> Result<Vec<u8>, BackendError> {
        let url = self.url(&["document-requests", "download", request_id])?;
        request_log::log_relay("GET", url.as_str(), None, self.verbose);
        let response = self.http.get(url).send().await?;
        let response = self.check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    pub async fn health(&self) -> Result<Value, BackendError> {
        self.get_json(&["health"]).await
    }
}
