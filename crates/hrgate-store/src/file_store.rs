use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::SessionRepository;
use hrgate_types::ChatSession;

/// JSON-file repository holding the full session list in one document
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a file store under `data_dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).with_context(|| {
                format!("Failed to create data directory: {}", data_dir.display())
            })?;
        }
        Ok(Self {
            path: data_dir.join("sessions.json"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionRepository for FileStore {
    async fn load(&self) -> Result<Vec<ChatSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read sessions from {}", self.path.display()))?;
        let sessions: Vec<ChatSession> =
            serde_json::from_str(&json).context("Failed to deserialize sessions")?;
        Ok(sessions)
    }

    async fn save(&self, sessions: &[ChatSession]) -> Result<()> {
        let json =
            serde_json::to_string_pretty(sessions).context("Failed to serialize sessions")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write sessions to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let sessions = vec![ChatSession::fresh()];
        store.save(&sessions).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, sessions[0].id);
        assert!(loaded[0].is_active);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        fs::write(store.path(), "not json at all").unwrap();
        assert!(store.load().await.is_err());
    }
}
