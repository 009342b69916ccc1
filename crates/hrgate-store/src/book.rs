use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::SessionRepository;
use hrgate_types::{ChatSession, Message, MessageRole, TITLE_MAX_CHARS};

/// Session title derived from the first user message, capped at
/// `TITLE_MAX_CHARS` characters
pub fn derive_title(messages: &[Message]) -> String {
    match messages.iter().find(|m| m.role == MessageRole::User) {
        Some(first) => {
            if first.content.chars().count() > TITLE_MAX_CHARS {
                let head: String = first.content.chars().take(TITLE_MAX_CHARS).collect();
                format!("{}...", head)
            } else {
                first.content.clone()
            }
        }
        None => "New Chat".to_string(),
    }
}

/// Listing shape for the sessions API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            message_count: session.messages.len(),
            created_at: session.created_at.to_rfc3339(),
            updated_at: session.updated_at.to_rfc3339(),
            is_active: session.is_active,
        }
    }
}

/// Ordered collection of conversations with the store invariants enforced on
/// every mutation: the list is never empty and exactly one session is active.
pub struct SessionBook {
    sessions: RwLock<Vec<ChatSession>>,
    repo: Arc<dyn SessionRepository>,
}

impl SessionBook {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions: RwLock::new(Vec::new()),
            repo,
        }
    }

    /// Load persisted sessions. Storage failures degrade to an empty list
    /// instead of failing startup; a fresh session is created if none exist.
    pub async fn init(&self) {
        let loaded = match self.repo.load().await {
            Ok(sessions) => sessions,
            Err(e) => {
                eprintln!("{} Failed to load sessions: {}", "⚠️".yellow(), e);
                Vec::new()
            }
        };

        let mut sessions = self.sessions.write().await;
        *sessions = loaded;
        if sessions.is_empty() {
            sessions.push(ChatSession::fresh());
        }
        Self::normalize_active(&mut sessions);
        self.persist(&sessions).await;
    }

    /// Keep exactly one session active, preferring the most recently updated
    fn normalize_active(sessions: &mut [ChatSession]) {
        let chosen = sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active)
            .max_by_key(|(_, s)| s.updated_at)
            .or_else(|| {
                sessions
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, s)| s.updated_at)
            })
            .map(|(i, _)| i);

        if let Some(chosen) = chosen {
            for (i, session) in sessions.iter_mut().enumerate() {
                session.is_active = i == chosen;
            }
        }
    }

    async fn persist(&self, sessions: &[ChatSession]) {
        if let Err(e) = self.repo.save(sessions).await {
            eprintln!("{} Failed to save sessions: {}", "⚠️".yellow(), e);
        }
    }

    /// All sessions, most recently updated first
    pub async fn list_summaries(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions.iter().map(Into::into).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    pub async fn session(&self, id: &str) -> Option<ChatSession> {
        self.sessions.read().await.iter().find(|s| s.id == id).cloned()
    }

    /// The active session (guaranteed to exist after init)
    pub async fn active(&self) -> Option<ChatSession> {
        self.sessions.read().await.iter().find(|s| s.is_active).cloned()
    }

    /// Start a new chat: deactivate everything else, append a fresh session
    pub async fn new_session(&self) -> ChatSession {
        let mut sessions = self.sessions.write().await;
        for session in sessions.iter_mut() {
            session.is_active = false;
        }
        let fresh = ChatSession::fresh();
        sessions.push(fresh.clone());
        self.persist(&sessions).await;
        fresh
    }

    /// Mark one session active, deactivating all others
    pub async fn activate(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        if !sessions.iter().any(|s| s.id == id) {
            return false;
        }
        for session in sessions.iter_mut() {
            session.is_active = session.id == id;
        }
        self.persist(&sessions).await;
        true
    }

    /// Delete a session. Deleting the active one creates a replacement so the
    /// list never goes empty.
    pub async fn delete_session(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let was_active = sessions.iter().any(|s| s.id == id && s.is_active);
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return false;
        }
        if sessions.is_empty() || was_active {
            for session in sessions.iter_mut() {
                session.is_active = false;
            }
            sessions.push(ChatSession::fresh());
        }
        self.persist(&sessions).await;
        true
    }

    /// Drop all history and start over with a single fresh session.
    /// Returns (sessions removed, messages removed) for the caller's summary.
    pub async fn clear_all(&self) -> (usize, usize) {
        let mut sessions = self.sessions.write().await;
        let removed_sessions = sessions.len();
        let removed_messages = sessions.iter().map(|s| s.messages.len()).sum();
        sessions.clear();
        sessions.push(ChatSession::fresh());
        self.persist(&sessions).await;
        (removed_sessions, removed_messages)
    }

    /// Apply a mutation to the active session's messages, then refresh its
    /// timestamp and derived title and persist.
    pub async fn with_active_mut<R>(&self, f: impl FnOnce(&mut Vec<Message>) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        if !sessions.iter().any(|s| s.is_active) {
            for session in sessions.iter_mut() {
                session.is_active = false;
            }
            sessions.push(ChatSession::fresh());
        }
        let session = sessions
            .iter_mut()
            .find(|s| s.is_active)
            .expect("active session exists");
        let result = f(&mut session.messages);
        session.updated_at = chrono::Utc::now();
        session.title = derive_title(&session.messages);
        self.persist(&sessions).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn book() -> SessionBook {
        SessionBook::new(Arc::new(MemoryStore::new()))
    }

    fn active_count(summaries: &[SessionSummary]) -> usize {
        summaries.iter().filter(|s| s.is_active).count()
    }

    #[tokio::test]
    async fn test_init_creates_a_session_when_empty() {
        let book = book();
        book.init().await;
        let summaries = book.list_summaries().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(active_count(&summaries), 1);
    }

    #[tokio::test]
    async fn test_new_session_keeps_exactly_one_active() {
        let book = book();
        book.init().await;
        book.new_session().await;
        book.new_session().await;
        let summaries = book.list_summaries().await;
        assert_eq!(summaries.len(), 3);
        assert_eq!(active_count(&summaries), 1);
    }

    #[tokio::test]
    async fn test_activate_switches_the_active_session() {
        let book = book();
        book.init().await;
        let first = book.active().await.unwrap();
        book.new_session().await;
        assert!(book.activate(&first.id).await);
        assert_eq!(book.active().await.unwrap().id, first.id);
        assert_eq!(active_count(&book.list_summaries().await), 1);
    }

    #[tokio::test]
    async fn test_deleting_active_session_creates_replacement() {
        let book = book();
        book.init().await;
        let active = book.active().await.unwrap();
        assert!(book.delete_session(&active.id).await);
        let summaries = book.list_summaries().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(active_count(&summaries), 1);
        assert_ne!(summaries[0].id, active.id);
    }

    #[tokio::test]
    async fn test_deleting_inactive_session_keeps_active_one() {
        let book = book();
        book.init().await;
        let first = book.active().await.unwrap();
        let second = book.new_session().await;
        assert!(book.delete_session(&first.id).await);
        assert_eq!(book.active().await.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_clear_all_reports_counts_and_restarts() {
        let book = book();
        book.init().await;
        book.new_session().await;
        let (sessions, messages) = book.clear_all().await;
        assert_eq!(sessions, 2);
        assert_eq!(messages, 2); // one greeting each
        let summaries = book.list_summaries().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(active_count(&summaries), 1);
    }

    #[tokio::test]
    async fn test_mutation_refreshes_title_and_timestamp() {
        let book = book();
        book.init().await;
        book.with_active_mut(|messages| {
            messages.push(Message::user("How many paid leave days do I have left this year?"));
        })
        .await;
        let active = book.active().await.unwrap();
        assert!(active.title.ends_with("..."));
        assert_eq!(active.title.chars().count(), TITLE_MAX_CHARS + 3);
    }

    #[test]
    fn test_derive_title_without_user_message() {
        let messages = vec![Message::assistant("hello")];
        assert_eq!(derive_title(&messages), "New Chat");
    }

    #[test]
    fn test_derive_title_short_message_is_untouched() {
        let messages = vec![Message::user("leave policy?")];
        assert_eq!(derive_title(&messages), "leave policy?");
    }
}
