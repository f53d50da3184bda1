//! Per-conversation session storage.
//!
//! An explicit map from `(chat, user)` to [`ConversationSession`]. A session
//! that was never written reads as `Idle`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::dialogue::DialogState;

/// Identity of one user in one chat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user_id: u64,
}

impl SessionKey {
    pub fn new(chat_id: i64, user_id: u64) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversationSession {
    pub user_id: u64,
    pub state: DialogState,
}

impl ConversationSession {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            state: DialogState::default(),
        }
    }
}

/// Shared, cloneable session map
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionKey, ConversationSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session for `key`, or a fresh `Idle` one
    pub async fn get(&self, key: SessionKey) -> ConversationSession {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&key)
            .copied()
            .unwrap_or_else(|| ConversationSession::new(key.user_id))
    }

    pub async fn state(&self, key: SessionKey) -> DialogState {
        self.get(key).await.state
    }

    /// Store the state for `key`. Returning to `Idle` drops the entry.
    pub async fn set_state(&self, key: SessionKey, state: DialogState) {
        let mut sessions = self.sessions.lock().await;
        match state {
            DialogState::Idle => {
                sessions.remove(&key);
            }
            DialogState::AwaitingAiQuestion => {
                sessions
                    .entry(key)
                    .or_insert_with(|| ConversationSession::new(key.user_id))
                    .state = state;
            }
        }
    }

    /// Number of sessions currently away from `Idle`
    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
