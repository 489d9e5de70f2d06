//! Session module - per-connection conversation state
//!
//! This module provides the turn-state store used by the gateway:
//! - In-memory session storage with async access
//! - Optional file-based persistence (one JSON file per session)
//! - Eviction when a connection ends
//!
//! # Example
//!
//! ```
//! use premiumbot::session::{SessionManager, Message, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = SessionManager::new_memory();
//!
//!     let mut session = Session::new("session-1");
//!     session.add_message(Message::user("Hello!"));
//!     manager.save(&session).await.unwrap();
//!
//!     assert!(manager.get("session-1").await.unwrap().is_some());
//! }
//! ```

pub mod types;

pub use types::{Message, Role, Session, ToolCall};

use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session store keyed by session id.
///
/// Clones share the same underlying map, so the gateway and any background
/// task see the same sessions.
#[derive(Clone)]
pub struct SessionManager {
    /// In-memory cache of sessions
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    /// Optional directory for file-based persistence
    storage_path: Option<PathBuf>,
}

impl SessionManager {
    /// Create an in-memory session manager without persistence.
    pub fn new_memory() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            storage_path: None,
        }
    }

    /// Create a session manager that also writes sessions to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            storage_path: Some(path),
        })
    }

    /// Whether sessions are written to disk.
    pub fn is_persistent(&self) -> bool {
        self.storage_path.is_some()
    }

    /// Get a session by key.
    ///
    /// Checks memory first, then disk when persistence is enabled.
    pub async fn get(&self, key: &str) -> Result<Option<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(key) {
                return Ok(Some(session.clone()));
            }
        }

        if let Some(file_path) = self.file_path(key) {
            if file_path.exists() {
                let content = tokio::fs::read_to_string(&file_path).await?;
                let session: Session = serde_json::from_str(&content)?;

                let mut sessions = self.sessions.write().await;
                sessions.insert(key.to_string(), session.clone());
                return Ok(Some(session));
            }
        }

        Ok(None)
    }

    /// Save a session to memory and, if enabled, to disk.
    pub async fn save(&self, session: &Session) -> Result<()> {
        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session.key.clone(), session.clone());
        }

        if let Some(file_path) = self.file_path(&session.key) {
            let content = serde_json::to_string_pretty(session)?;
            tokio::fs::write(&file_path, content).await?;
        }

        Ok(())
    }

    /// Drop a session from memory. A persisted copy on disk is kept.
    ///
    /// Returns `true` if the session was resident.
    pub async fn evict(&self, key: &str) -> bool {
        let removed = self.sessions.write().await.remove(key).is_some();
        debug!(session_id = %key, removed, "Session evicted");
        removed
    }

    /// Remove a session from memory and disk.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.sessions.write().await.remove(key);

        if let Some(file_path) = self.file_path(key) {
            if file_path.exists() {
                tokio::fs::remove_file(&file_path).await?;
            }
        }

        Ok(())
    }

    /// Number of sessions currently held in memory.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are held in memory.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn file_path(&self, key: &str) -> Option<PathBuf> {
        self.storage_path
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", Self::sanitize_key(key))))
    }

    /// Make a key safe to use as a file name.
    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_memory_save_and_get() {
        let manager = SessionManager::new_memory();
        let mut session = Session::new("s1");
        session.add_message(Message::user("Hello"));
        manager.save(&session).await.unwrap();

        let loaded = manager.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(manager.len().await, 1);
        assert!(!manager.is_persistent());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let manager = SessionManager::new_memory();
        assert!(manager.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_evict_removes_from_memory() {
        let manager = SessionManager::new_memory();
        manager.save(&Session::new("s1")).await.unwrap();
        assert!(manager.evict("s1").await);
        assert!(!manager.evict("s1").await);
        assert!(manager.is_empty().await);
        assert!(manager.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistence_survives_eviction() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::with_path(dir.path().to_path_buf()).unwrap();
        let mut session = Session::new("persisted");
        session.add_message(Message::system("sys"));
        manager.save(&session).await.unwrap();

        manager.evict("persisted").await;
        let reloaded = manager.get("persisted").await.unwrap().unwrap();
        assert_eq!(reloaded.messages[0].content, "sys");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::with_path(dir.path().to_path_buf()).unwrap();
        manager.save(&Session::new("gone")).await.unwrap();
        assert!(dir.path().join("gone.json").exists());

        manager.delete("gone").await.unwrap();
        assert!(!dir.path().join("gone.json").exists());
        assert!(manager.get("gone").await.unwrap().is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(SessionManager::sanitize_key("a/b:c"), "a_b_c");
        assert_eq!(
            SessionManager::sanitize_key("0f8fad5b-d9cb-469f-a165-70867728950e"),
            "0f8fad5b-d9cb-469f-a165-70867728950e"
        );
    }
}
