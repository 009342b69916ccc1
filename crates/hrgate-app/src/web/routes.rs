use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{delete, get, post, put},
    Router,
};
use colored::Colorize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::web::{cookies, validate};
use hrgate_backend::{BackendClient, BackendError, DocumentRequest, EmployeeRecord};
use hrgate_chat::{ChatOrchestrator, DeleteOutcome, EditOutcome, JobTracker, TurnReply};
use hrgate_store::SessionBook;
use hrgate_types::{TrackedJob, MAX_PDF_BYTES};

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub tracker: Arc<JobTracker>,
    pub sessions: Arc<SessionBook>,
    pub production: bool,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Auth relay
        .route("/api/auth/send-otp", post(send_otp))
        .route("/api/auth/resend-otp", post(resend_otp))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        // Chat
        .route("/api/chat", post(chat))
        .route("/api/chat/edit-message", put(edit_message))
        .route("/api/chat/delete-message", delete(delete_message))
        // PDF summarization
        .route("/api/upload-pdf", post(upload_pdf))
        .route("/api/process-pdf", post(process_pdf))
        .route("/api/download-summary-pdf", post(download_summary_pdf))
        // Documents and employee lookup
        .route("/api/employee-search", post(employee_search))
        .route("/api/employee-validate", post(employee_validate))
        .route("/api/generate-document", post(generate_document))
        // Sessions
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/clear", post(clear_sessions))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/:id/activate", post(activate_session))
        // Health
        .route("/api/health", get(health))
        .layer(middleware::from_fn(require_session))
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES + 1024 * 1024))
        .with_state(state)
}

/// Route guard: no session cookie means a redirect to /login, except for the
/// public paths. API callers probing /api/auth/me get the 401 directly.
async fn require_session(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if cookies::is_public_path(path) || cookies::session_token(req.headers()).is_some() {
        return next.run(req).await;
    }
    if path == "/api/auth/me" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Not authenticated" })),
        )
            .into_response();
    }
    Redirect::temporary("/login").into_response()
}

// ----------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------

/// POST /api/auth/send-otp - Relay an OTP request to the backend
async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let email = validate::require_email(&body).map_err(ApiError::Validation)?;
    let data = state.backend.send_otp(&email).await?;
    Ok(Json(data))
}

/// POST /api/auth/resend-otp - Relay an OTP resend
async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let email = validate::require_email(&body).map_err(ApiError::Validation)?;
    let data = state.backend.resend_otp(&email).await?;
    Ok(Json(data))
}

/// POST /api/auth/verify-otp - Verify the OTP and establish the session
/// cookie when the backend hands back a token
async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (email, otp) = validate::require_email_and_otp(&body).map_err(ApiError::Validation)?;
    let data = state.backend.verify_otp(&email, &otp).await?;

    let token = data.get("token").and_then(|v| v.as_str()).map(str::to_string);
    let mut response = Json(data).into_response();
    if let Some(token) = token {
        let cookie = cookies::session_cookie(&token, state.production);
        let value = HeaderValue::from_str(&cookie).map_err(|_| {
            ApiError::Backend(BackendError::InvalidResponse(
                "token is not a valid cookie value".into(),
            ))
        })?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    } else {
        eprintln!("{} Verify OTP - no token in backend response", "⚠️".yellow());
    }
    Ok(response)
}

/// GET /api/auth/me - Report on the current session
async fn me(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let Some(token) = cookies::session_token(&headers) else {
        return Err(ApiError::Unauthorized);
    };
    let data = state.backend.me(&token).await?;
    Ok(Json(data))
}

/// POST /api/auth/logout - Always succeeds and clears the cookie; the backend
/// notification is fire-and-forget
async fn logout(State(state): State<AppState>) -> Response {
    let backend = state.backend.clone();
    tokio::spawn(async move {
        if let Err(e) = backend.notify_logout().await {
            eprintln!(
                "{} Logout - backend notification failed (non-critical): {}",
                "⚠️".yellow(),
                e
            );
        }
    });

    let mut response = Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&cookies::expired_session_cookie(state.production)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

// ----------------------------------------------------------------------
// Chat
// ----------------------------------------------------------------------

/// Response fields describing what the UI should do after a chat turn
fn turn_reply_json(reply: &TurnReply) -> Value {
    match reply {
        TurnReply::Answer(message) => json!({
            "success": true,
            "response": message.content,
            "timestamp": message.timestamp.to_rfc3339(),
        }),
        TurnReply::OpenDocumentForm { prompt, document } => {
            let mut value = json!({
                "success": true,
                "response": prompt.content,
                "timestamp": prompt.timestamp.to_rfc3339(),
                "action": "show_document_form",
            });
            if let Some((doc_type, doc_name)) = document {
                value["document"] = json!({ "type": doc_type, "name": doc_name });
            }
            value
        }
        TurnReply::OpenPdfUploader { prompt } => json!({
            "success": true,
            "response": prompt.content,
            "timestamp": prompt.timestamp.to_rfc3339(),
            "action": "show_pdf_upload",
        }),
    }
}

/// POST /api/chat - Run a full chat turn through the orchestrator
async fn chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let message = validate::require_message(&body).map_err(ApiError::Validation)?;
    let reply = state.orchestrator.handle_user_message(&message).await?;
    Ok(Json(turn_reply_json(&reply)))
}

/// PUT /api/chat/edit-message - Edit a message and regenerate its reply
async fn edit_message(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (message_id, new_content) =
        validate::require_message_edit(&body).map_err(ApiError::Validation)?;
    let reply = state
        .orchestrator
        .edit_message(&message_id, &new_content)
        .await?;

    let mut response = json!({
        "success": true,
        "message": "Message updated successfully",
        "data": {
            "messageId": message_id,
            "newContent": new_content,
            "updatedAt": chrono::Utc::now().to_rfc3339(),
        },
    });
    if reply.outcome == EditOutcome::NotFound {
        response["message"] = json!("Message not found; nothing to update");
    }
    if let Some(regenerated) = reply.regenerated {
        response["regenerated"] = turn_reply_json(&regenerated);
    }
    Ok(Json(response))
}

/// DELETE /api/chat/delete-message - Remove a message (and its paired reply)
async fn delete_message(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let message_id = validate::require_message_id(&body).map_err(ApiError::Validation)?;
    let removed = match state.orchestrator.delete_message(&message_id).await {
        DeleteOutcome::Removed(n) => n,
        DeleteOutcome::NotFound => 0,
    };
    Ok(Json(json!({
        "success": true,
        "message": "Message deleted successfully",
        "data": {
            "messageId": message_id,
            "removed": removed,
            "deletedAt": chrono::Utc::now().to_rfc3339(),
        },
    })))
}

// ----------------------------------------------------------------------
// PDF summarization
// ----------------------------------------------------------------------

/// POST /api/upload-pdf - Accept a multipart PDF, relay it, and start the
/// status poll loop for the returned job
async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("document.pdf").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
            upload = Some((file_name, content_type, bytes.to_vec()));
        }
    }

    let Some((file_name, content_type, bytes)) = upload else {
        return Err(ApiError::Validation("No file provided".into()));
    };
    validate::check_pdf_upload(Some(content_type.as_str()), bytes.len())
        .map_err(ApiError::Validation)?;

    let file_size = bytes.len() as u64;
    let job_id = state.backend.upload_pdf(&file_name, bytes).await?;

    let job = TrackedJob::new(&job_id, &file_name, file_size);
    state.tracker.start(state.backend.clone(), job).await;

    Ok(Json(json!({
        "success": true,
        "jobId": job_id,
        "fileName": file_name,
        "fileSize": file_size,
        "status": "processing",
        "message": "PDF processing started",
    })))
}

/// POST /api/process-pdf - One-shot status check for a summarization job
async fn process_pdf(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let job_id = validate::require_job_id(&body).map_err(ApiError::Validation)?;
    let payload = state.backend.job_status(&job_id).await?;

    let mut response = serde_json::to_value(&payload)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    response["success"] = json!(true);
    Ok(Json(response))
}

/// POST /api/download-summary-pdf - Render a completed summary as a PDF
/// attachment
async fn download_summary_pdf(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (summary, filename) =
        validate::require_summary_request(&body).map_err(ApiError::Validation)?;
    let bytes = state
        .backend
        .download_summary_pdf(&summary, &filename)
        .await?;

    let stem = filename.strip_suffix(".pdf").unwrap_or(&filename);
    let disposition = format!("attachment; filename=\"{}_summary.pdf\"", stem);
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"summary.pdf\""));

    let mut response = bytes.into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

// ----------------------------------------------------------------------
// Documents and employee lookup
// ----------------------------------------------------------------------

/// POST /api/employee-search - Relay name suggestions for the document form
async fn employee_search(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let query = validate::require_query(&body).map_err(ApiError::Validation)?;
    let data = state.backend.employee_suggestions(&query).await?;
    Ok(Json(json!({
        "success": data.get("success").and_then(|v| v.as_bool()).unwrap_or(false),
        "suggestions": data.get("suggestions").cloned().unwrap_or_else(|| json!([])),
        "count": data.get("count").cloned().unwrap_or_else(|| json!(0)),
        "error": data.get("error").cloned().unwrap_or(Value::Null),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// POST /api/employee-validate - Map the form's camelCase fields to the
/// backend record shape and relay
async fn employee_validate(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    validate::require_employee_fields(&body).map_err(ApiError::Validation)?;

    let field = |camel: &str, snake: &str| -> String {
        body.get(camel)
            .or_else(|| body.get(snake))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    let record = EmployeeRecord {
        full_name: field("employeeName", "full_name"),
        employee_code: field("employeeId", "employee_code"),
        designation: field("designation", "designation"),
        department: field("department", "department"),
        joining_date: field("joiningDate", "joining_date"),
    };

    let mut data = state.backend.validate_employee(&record).await?;
    data["success"] = json!(true);
    Ok(Json(data))
}

/// Form fields the document templates know about, in the backend's order
const DOCUMENT_FORM_FIELDS: &[&str] = &[
    "employeeName",
    "employeeId",
    "designation",
    "department",
    "joiningDate",
    "relievingDate",
    "salaryAmount",
    "appointmentDate",
    "promotionDate",
    "newDesignation",
    "nocPurpose",
    "effectiveDate",
    "signingDate",
    "reason",
    "destination",
    "purpose",
    "duration",
    "travelDate",
];

/// POST /api/generate-document - Submit a document request, verify the PDF
/// generated, and hand back backend download/preview URLs
async fn generate_document(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (document_type, document_name, form_data) =
        validate::require_document_request(&body).map_err(ApiError::Validation)?;

    let mut details = serde_json::Map::new();
    for field in DOCUMENT_FORM_FIELDS {
        let value = form_data
            .get(*field)
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        details.insert(field.to_string(), json!(value));
    }
    let details = serde_json::to_string(&Value::Object(details))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let request = DocumentRequest {
        document_type,
        document_name,
        user_id: "anonymous".to_string(),
        details,
    };
    let submission = state.backend.submit_document_request(&request).await?;

    if submission.status.as_deref() == Some("error") {
        return Err(ApiError::Internal(
            submission
                .message
                .unwrap_or_else(|| "Document generation failed".to_string()),
        ));
    }

    // Confirm the PDF actually renders before handing out URLs
    state
        .backend
        .download_document(&submission.request_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "downloadUrl": state.backend.document_download_url(&submission.request_id),
        "previewUrl": state.backend.document_preview_url(&submission.request_id),
        "requestId": submission.request_id,
    })))
}

// ----------------------------------------------------------------------
// Sessions
// ----------------------------------------------------------------------

/// GET /api/sessions - List all chat sessions, newest first
async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    let sessions = state.sessions.list_summaries().await;
    Json(json!({ "sessions": sessions }))
}

/// POST /api/sessions - Start a new chat session
async fn create_session(State(state): State<AppState>) -> Json<Value> {
    let session = state.sessions.new_session().await;
    Json(json!({ "success": true, "session": session }))
}

/// GET /api/sessions/:id - Full session including message history
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = state
        .sessions
        .session(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;
    Ok(Json(json!({ "success": true, "session": session })))
}

/// DELETE /api/sessions/:id - Remove a session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.sessions.delete_session(&id).await {
        return Err(ApiError::NotFound("Session not found".into()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Session deleted successfully",
    })))
}

/// POST /api/sessions/:id/activate - Switch the active session
async fn activate_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.sessions.activate(&id).await {
        return Err(ApiError::NotFound("Session not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

/// POST /api/sessions/clear - Drop all history and start over
async fn clear_sessions(State(state): State<AppState>) -> Json<Value> {
    let (removed_sessions, removed_messages) = state.sessions.clear_all().await;
    Json(json!({
        "success": true,
        "removedSessions": removed_sessions,
        "removedMessages": removed_messages,
    }))
}

// ----------------------------------------------------------------------
// Health
// ----------------------------------------------------------------------

/// GET /api/health - Probe the backend and report overall status
async fn health(State(state): State<AppState>) -> Response {
    match state.backend.health().await {
        Ok(backend_data) => Json(json!({
            "status": "ok",
            "message": "All systems operational",
            "backend_status": "ok",
            "backend_url": state.backend.base_url(),
            "backend_data": backend_data,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "message": "Backend is not responding properly",
                "error": e.to_string(),
                "backend_url": state.backend.base_url(),
            })),
        )
            .into_response(),
    }
}

// ----------------------------------------------------------------------
// Error handling
// ----------------------------------------------------------------------

/// Error handling
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Unauthorized,
    Internal(String),
    Backend(BackendError),
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError::Backend(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Backend(err) => {
                let status = StatusCode::from_u16(err.relay_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = match err {
                    BackendError::Upstream { message, .. } => message,
                    BackendError::Unreachable(_) => {
                        "Network error: Unable to connect to backend service".to_string()
                    }
                    BackendError::InvalidResponse(_) => {
                        "Invalid response format from backend".to_string()
                    }
                };
                (status, message)
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
