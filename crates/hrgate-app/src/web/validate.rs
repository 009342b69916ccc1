//! Handler-local request validation.
//!
//! Every check here runs before any backend contact; a failure is a 400 and
//! the upstream never sees the request. Error strings match what the login
//! and chat UIs expect to display.

use serde_json::Value;

use hrgate_types::MAX_PDF_BYTES;

fn str_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

pub fn require_email(body: &Value) -> Result<String, String> {
    str_field(body, "email")
        .map(str::to_string)
        .ok_or_else(|| "Email is required".to_string())
}

pub fn require_email_and_otp(body: &Value) -> Result<(String, String), String> {
    match (str_field(body, "email"), str_field(body, "otp")) {
        (Some(email), Some(otp)) => Ok((email.to_string(), otp.to_string())),
        _ => Err("Email and OTP are required".to_string()),
    }
}

pub fn require_message(body: &Value) -> Result<String, String> {
    str_field(body, "message")
        .map(str::to_string)
        .ok_or_else(|| "Message is required".to_string())
}

pub fn require_query(body: &Value) -> Result<String, String> {
    str_field(body, "query")
        .map(str::to_string)
        .ok_or_else(|| "Query is required".to_string())
}

pub fn require_job_id(body: &Value) -> Result<String, String> {
    str_field(body, "jobId")
        .map(|s| s.trim().to_string())
        .ok_or_else(|| "Job ID is required and must be a non-empty string".to_string())
}

pub fn require_message_edit(body: &Value) -> Result<(String, String), String> {
    match (str_field(body, "messageId"), str_field(body, "newContent")) {
        (Some(id), Some(content)) => Ok((id.to_string(), content.to_string())),
        _ => Err("Message ID and new content are required".to_string()),
    }
}

pub fn require_message_id(body: &Value) -> Result<String, String> {
    str_field(body, "messageId")
        .map(str::to_string)
        .ok_or_else(|| "Message ID is required".to_string())
}

/// Uploaded PDF checks: mimetype and size limit
pub fn check_pdf_upload(content_type: Option<&str>, size: usize) -> Result<(), String> {
    if content_type != Some("application/pdf") {
        return Err("Only PDF files are allowed".to_string());
    }
    if size > MAX_PDF_BYTES {
        return Err("File size exceeds 50MB limit".to_string());
    }
    Ok(())
}

/// Employee validation payload must carry the two identifying fields
pub fn require_employee_fields(body: &Value) -> Result<(), String> {
    if !body.is_object() {
        return Err("Employee data is required and must be a valid object".to_string());
    }
    let missing: Vec<&str> = ["employeeName", "employeeId"]
        .into_iter()
        .filter(|field| str_field(body, field).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}

/// Document generation payload: type, name, and the form data object
pub fn require_document_request(body: &Value) -> Result<(String, String, Value), String> {
    let missing_msg =
        "Missing required fields: documentType, documentName, and formData are required";
    let document_type = str_field(body, "documentType").ok_or(missing_msg)?;
    let document_name = str_field(body, "documentName").ok_or(missing_msg)?;
    let form_data = body.get("formData").cloned().ok_or(missing_msg)?;
    if !form_data.is_object() {
        return Err("Form data must be a valid object".to_string());
    }
    Ok((
        document_type.to_string(),
        document_name.to_string(),
        form_data,
    ))
}

/// Summary-download payload: the summary object plus a sanitized filename
pub fn require_summary_request(body: &Value) -> Result<(Value, String), String> {
    let summary = body
        .get("summary_data")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| "Summary data is required and must be a valid object".to_string())?;
    let filename = match body.get("original_filename") {
        None | Some(Value::Null) => "document.pdf".to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err("Original filename must be a valid string".to_string()),
    };
    Ok((summary, filename))
}
