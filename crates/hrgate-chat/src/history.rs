//! Pure operations over a session's message list.
//!
//! Nothing here mutates in place beyond the target list itself; callers go
//! through `SessionBook::with_active_mut` so timestamps, titles and
//! persistence happen in one place.

use chrono::Utc;
use hrgate_types::{Message, MessageRole};

/// Result of an edit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Target id does not exist. The original UI silently ignored this;
    /// callers may log it but must not fail the request.
    NotFound,
    /// Message edited; `removed` messages after it were truncated because an
    /// edit invalidates the rest of the conversation branch.
    Edited { removed: usize },
}

/// Result of a delete attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotFound,
    /// Number of messages removed: 2 for a user message with its paired
    /// assistant reply, otherwise 1.
    Removed(usize),
}

/// Append a message to the tail, returning a copy of what was stored
pub fn append(messages: &mut Vec<Message>, role: MessageRole, content: impl Into<String>) -> Message {
    let message = Message::new(role, content);
    messages.push(message.clone());
    message
}

/// Edit a message in place and truncate everything after it
pub fn edit(messages: &mut Vec<Message>, id: &str, new_content: &str) -> EditOutcome {
    let Some(index) = messages.iter().position(|m| m.id == id) else {
        return EditOutcome::NotFound;
    };

    let message = &mut messages[index];
    message.content = new_content.to_string();
    message.edited = true;
    message.edited_at = Some(Utc::now());

    let removed = messages.len() - (index + 1);
    messages.truncate(index + 1);
    EditOutcome::Edited { removed }
}

/// Delete a message; a user message followed directly by an assistant reply
/// is removed as a pair
pub fn delete(messages: &mut Vec<Message>, id: &str) -> DeleteOutcome {
    let Some(index) = messages.iter().position(|m| m.id == id) else {
        return DeleteOutcome::NotFound;
    };

    let is_user = messages[index].role == MessageRole::User;
    let has_paired_reply = is_user
        && messages
            .get(index + 1)
            .map(|m| m.role == MessageRole::Assistant)
            .unwrap_or(false);

    if has_paired_reply {
        messages.drain(index..=index + 1);
        DeleteOutcome::Removed(2)
    } else {
        messages.remove(index);
        DeleteOutcome::Removed(1)
    }
}
