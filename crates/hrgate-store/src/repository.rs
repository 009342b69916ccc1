use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use hrgate_types::ChatSession;

/// Durable record of all conversations.
///
/// Persistence is whole-list overwrite, no deltas; the book serializes
/// callers so save order matches mutation order.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<ChatSession>>;
    async fn save(&self, sessions: &[ChatSession]) -> Result<()>;
}

/// In-memory repository for tests and --ephemeral mode
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<Vec<ChatSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn load(&self) -> Result<Vec<ChatSession>> {
        Ok(self.sessions.read().await.clone())
    }

    async fn save(&self, sessions: &[ChatSession]) -> Result<()> {
        *self.sessions.write().await = sessions.to_vec();
        Ok(())
    }
}
