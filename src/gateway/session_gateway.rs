//! Session gateway: owns sessions and runs their turns.
//!
//! One `SessionGateway` serves every connection. Sessions are independent;
//! turns within one session are serialized by a per-session lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::agent::{ContextBuilder, ConversationDriver};
use crate::error::{BotError, Result};
use crate::session::{Message, Session, SessionManager};

/// A freshly opened session and the greeting produced by its first turn.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub id: String,
    pub greeting: String,
}

pub struct SessionGateway {
    driver: ConversationDriver,
    context: ContextBuilder,
    sessions: SessionManager,
    /// Per-session locks to serialize turns for the same session
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionGateway {
    pub fn new(driver: ConversationDriver, context: ContextBuilder, sessions: SessionManager) -> Self {
        Self {
            driver,
            context,
            sessions,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session, run the greeting turn and store the result.
    ///
    /// Nothing is stored if the greeting turn fails.
    pub async fn open_session(&self) -> Result<OpenedSession> {
        let session = self.context.new_session();
        let id = session.key.clone();
        debug!(session_id = %id, "Opening session");

        let session = self.driver.advance(session).await?;
        let greeting = final_answer(&session)?;
        self.sessions.save(&session).await?;

        info!(session_id = %id, "Session opened");
        Ok(OpenedSession { id, greeting })
    }

    /// Append the user's text, run the turn, and return the final answer.
    ///
    /// The stored session only changes when the turn completes; a failed or
    /// abandoned turn leaves it exactly as it was.
    pub async fn advance_with_user_text(&self, session_id: &str, text: &str) -> Result<String> {
        let lock = self.turn_lock(session_id).await?;
        let _guard = lock.lock().await;

        let mut session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;

        session.add_message(Message::user(text));
        let session = self.driver.advance(session).await?;
        let answer = final_answer(&session)?;
        self.sessions.save(&session).await?;
        Ok(answer)
    }

    /// End a session and evict its state from memory.
    ///
    /// Returns `true` if the session was open.
    pub async fn close_session(&self, session_id: &str) -> bool {
        self.turn_locks.lock().await.remove(session_id);
        let removed = self.sessions.evict(session_id).await;
        if removed {
            info!(session_id = %session_id, "Session closed");
        }
        removed
    }

    /// Snapshot of a session's history.
    pub async fn session(&self, session_id: &str) -> Result<Option<Session>> {
        self.sessions.get(session_id).await
    }

    /// Number of sessions currently open.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    /// Lock for an open session. Unknown ids never get an entry.
    async fn turn_lock(&self, session_id: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.turn_locks.lock().await;
        if let Some(lock) = locks.get(session_id) {
            return Ok(Arc::clone(lock));
        }
        if self.sessions.get(session_id).await?.is_none() {
            return Err(not_found(session_id));
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(session_id.to_string(), Arc::clone(&lock));
        Ok(lock)
    }
}

fn not_found(session_id: &str) -> BotError {
    BotError::NotFound(format!("session {}", session_id))
}

fn final_answer(session: &Session) -> Result<String> {
    session
        .last_message()
        .filter(|m| m.is_plain_assistant())
        .map(|m| m.content.clone())
        .ok_or_else(|| BotError::Session("turn ended without an assistant answer".into()))
}
