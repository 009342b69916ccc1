//! Core types and structures for hrgate
//!
//! This crate provides the foundational types used across all hrgate crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Name of the session cookie issued after OTP verification
pub const SESSION_COOKIE: &str = "session_token";

/// Session cookie lifetime in seconds (24 hours)
pub const SESSION_COOKIE_MAX_AGE: u64 = 86_400;

/// Maximum accepted PDF upload size
pub const MAX_PDF_BYTES: usize = 50 * 1024 * 1024;

/// Delay between job status polls
pub const POLL_INTERVAL_MS: u64 = 2_000;

/// Maximum characters of the first user message used as a session title
pub const TITLE_MAX_CHARS: usize = 30;

/// Greeting posted into every fresh chat session
pub const SESSION_GREETING: &str = "I'm ready to help you with HR questions!\n\
    \n\
    - Ask about company policies, benefits, and procedures\n\
    - Request official documents (type \"I need a document\")\n\
    - Upload PDFs for summarization (type \"summarize PDF\")\n\
    \n\
    Just type your question and I'll help you find the information you need!";

// ============================================================================
// Chat Messages
// ============================================================================

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single chat message inside a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            edited: false,
            edited_at: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Chat Sessions
// ============================================================================

/// A conversation with its ordered message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl ChatSession {
    /// Create a fresh active session seeded with the standard greeting
    pub fn fresh() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: "New Chat".to_string(),
            messages: vec![Message::assistant(SESSION_GREETING)],
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }
}

// ============================================================================
// Background Jobs
// ============================================================================

/// Lifecycle of a PDF summarization job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Uploading,
    Processing,
    Completed,
    Error,
}

impl JobState {
    /// Completed and Error are terminal; no further polling happens after them
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

/// An uploaded PDF tracked to completion via status polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedJob {
    pub job_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub state: JobState,
    #[serde(default)]
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
}

impl TrackedJob {
    pub fn new(job_id: impl Into<String>, file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            job_id: job_id.into(),
            file_name: file_name.into(),
            file_size,
            state: JobState::Uploading,
            progress: 0.0,
            message: None,
            summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_shape() {
        let session = ChatSession::fresh();
        assert!(session.is_active);
        assert_eq!(session.title, "New Chat");
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::Assistant);
    }

    #[test]
    fn test_job_state_terminality() {
        assert!(!JobState::Uploading.is_terminal());
        assert!(!JobState::Processing.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Error.is_terminal());
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn test_edited_fields_skipped_when_unset() {
        let msg = Message::user("hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("edited").is_none());
        assert!(value.get("edited_at").is_none());
    }
}
