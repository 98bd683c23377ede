//! Conversation thread boundary.
//!
//! Thread persistence belongs to the surrounding application; the answer
//! pipeline only reads a thread's turns through [`ThreadStore`]. The
//! in-memory implementation exists for tests and development.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The resident.
    Resident,
    /// The assistant.
    Assistant,
}

/// One turn of a persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn.
    pub sender: Sender,
    /// The turn text.
    pub text: String,
}

impl Turn {
    /// A resident turn.
    pub fn resident(text: impl Into<String>) -> Self {
        Self { sender: Sender::Resident, text: text.into() }
    }

    /// An assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant, text: text.into() }
    }
}

/// An ordered conversation owned by one resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread identifier.
    pub id: String,
    /// Turns in conversation order.
    pub turns: Vec<Turn>,
}

/// Read access to persisted conversation threads.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Load a thread by ID. Returns `None` when the thread does not exist;
    /// callers treat that as an empty history, not an error.
    async fn thread(&self, id: &str) -> Result<Option<Thread>>;
}

/// An in-memory [`ThreadStore`].
#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<String, Thread>>,
}

impl MemoryThreadStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a thread.
    pub async fn put(&self, thread: Thread) {
        self.threads.write().await.insert(thread.id.clone(), thread);
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn thread(&self, id: &str) -> Result<Option<Thread>> {
        Ok(self.threads.read().await.get(id).cloned())
    }
}
