//! Routes a typed user message to one of the three chat behaviors and keeps
//! the active session's history in step with what happened.

use async_trait::async_trait;
use colored::Colorize;
use std::sync::Arc;

use crate::history::{self, DeleteOutcome, EditOutcome};
use crate::intent::{classify, Intent};
use hrgate_backend::{BackendClient, BackendError};
use hrgate_store::SessionBook;
use hrgate_types::{Message, MessageRole};

const DOCUMENT_FORM_PROMPT: &str =
    "📝 I'll help you request a document! Please fill out the form below to generate your document.";
const PDF_UPLOAD_PROMPT: &str =
    "📄 I'll help you summarize your PDF! Please upload your document below.";
const EMPTY_ANSWER_FALLBACK: &str =
    "❌ Sorry, I couldn't process your question. Please try again.";

/// Chat answering seam; the backend client in production, a stub in tests
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, message: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn chat(&self, message: &str) -> Result<String, BackendError> {
        BackendClient::chat(self, message).await
    }
}

/// What the UI should do after a turn
#[derive(Debug, Clone)]
pub enum TurnReply {
    /// Plain answer appended to the conversation
    Answer(Message),
    /// Open the document request sub-form; `document` carries the
    /// (type, name) pair when the backend named one via SHOW_FORM
    OpenDocumentForm {
        prompt: Message,
        document: Option<(String, String)>,
    },
    /// Open the PDF upload sub-form
    OpenPdfUploader { prompt: Message },
}

/// Result of an edit: the mutator outcome plus the single regenerated reply
#[derive(Debug)]
pub struct EditReply {
    pub outcome: EditOutcome,
    pub regenerated: Option<TurnReply>,
}

pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    sessions: Arc<SessionBook>,
}

impl ChatOrchestrator {
    pub fn new(backend: Arc<dyn ChatBackend>, sessions: Arc<SessionBook>) -> Self {
        Self { backend, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionBook> {
        &self.sessions
    }

    /// Handle a typed message: record it, classify it, and either open a
    /// sub-form or relay to the Q&A endpoint.
    ///
    /// On backend failure the apologetic assistant message is still appended
    /// (the conversation stays coherent) and the error is returned so the
    /// HTTP layer can relay the upstream status.
    pub async fn handle_user_message(&self, text: &str) -> Result<TurnReply, BackendError> {
        let text = text.trim();
        self.sessions
            .with_active_mut(|messages| {
                history::append(messages, MessageRole::User, text);
            })
            .await;

        match classify(text) {
            Intent::DocumentRequest => {
                let prompt = self.append_assistant(DOCUMENT_FORM_PROMPT).await;
                Ok(TurnReply::OpenDocumentForm {
                    prompt,
                    document: None,
                })
            }
            Intent::PdfSummary => {
                let prompt = self.append_assistant(PDF_UPLOAD_PROMPT).await;
                Ok(TurnReply::OpenPdfUploader { prompt })
            }
            Intent::GeneralQuery => self.relay_question(text).await,
        }
    }

    /// Edit a message, truncate the invalidated tail, and regenerate exactly
    /// one assistant response for the new content. An unknown id stays a
    /// silent no-op (logged so the miss is at least visible).
    pub async fn edit_message(
        &self,
        message_id: &str,
        new_content: &str,
    ) -> Result<EditReply, BackendError> {
        let new_content = new_content.trim();
        let outcome = self
            .sessions
            .with_active_mut(|messages| history::edit(messages, message_id, new_content))
            .await;

        match outcome {
            EditOutcome::NotFound => {
                eprintln!(
                    "{} Edit target {} not found; ignoring",
                    "⚠️".yellow(),
                    message_id
                );
                Ok(EditReply {
                    outcome,
                    regenerated: None,
                })
            }
            EditOutcome::Edited { .. } => {
                let reply = self.relay_question(new_content).await?;
                Ok(EditReply {
                    outcome,
                    regenerated: Some(reply),
                })
            }
        }
    }

    /// Delete a message (and its paired assistant reply, when present)
    pub async fn delete_message(&self, message_id: &str) -> DeleteOutcome {
        self.sessions
            .with_active_mut(|messages| history::delete(messages, message_id))
            .await
    }

    /// Relay to the backend Q&A endpoint, handling SHOW_FORM replies
    async fn relay_question(&self, text: &str) -> Result<TurnReply, BackendError> {
        match self.backend.chat(text).await {
            Ok(answer) => {
                if let Some(form) = parse_show_form(&answer) {
                    let (doc_type, doc_name) = form;
                    let prompt = self
                        .append_assistant(format!(
                            "📝 Please fill in the details below to generate your {}.",
                            doc_name
                        ))
                        .await;
                    return Ok(TurnReply::OpenDocumentForm {
                        prompt,
                        document: Some((doc_type, doc_name)),
                    });
                }
                let content = if answer.is_empty() {
                    EMPTY_ANSWER_FALLBACK.to_string()
                } else {
                    answer
                };
                Ok(TurnReply::Answer(self.append_assistant(content).await))
            }
            Err(e) => {
                self.append_assistant(format!(
                    "❌ Sorry, I encountered an error processing your question: {}\n\n\
                     Please try again or contact support if the issue persists.",
                    e
                ))
                .await;
                Err(e)
            }
        }
    }

    async fn append_assistant(&self, content: impl Into<String>) -> Message {
        let content = content.into();
        self.sessions
            .with_active_mut(move |messages| {
                history::append(messages, MessageRole::Assistant, content)
            })
            .await
    }
}

/// Parse the backend's `SHOW_FORM:<type>:<name>` convention; anything that
/// does not split into exactly three parts is treated as a normal answer
fn parse_show_form(answer: &str) -> Option<(String, String)> {
    if !answer.starts_with("SHOW_FORM:") {
        return None;
    }
    let parts: Vec<&str> = answer.split(':').collect();
    if parts.len() == 3 {
        Some((parts[1].to_string(), parts[2].to_string()))
    } else {
        None
    }
}
