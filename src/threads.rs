//! Server-side conversation threads.
//!
//! A thread only ever grows by whole turns: the user message and the reply
//! are appended together once the agent has answered.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ai::{ConversationRole, ConversationTurn};

const TITLE_CHARS: usize = 60;

/// A stored conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadMessage {
    #[serde(flatten)]
    pub turn: ConversationTurn,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationThread {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ThreadMessage>,
}

impl ConversationThread {
    /// Turns in the shape the agent consumes.
    #[must_use]
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.messages.iter().map(|m| m.turn.clone()).collect()
    }

    /// Short title derived from the first user message.
    #[must_use]
    pub fn title(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.turn.role == ConversationRole::User)
            .map(|m| {
                let mut title: String = m.turn.content.chars().take(TITLE_CHARS).collect();
                if m.turn.content.chars().count() > TITLE_CHARS {
                    title.push('…');
                }
                title
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub id: Uuid,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ConversationThread> for ThreadSummary {
    fn from(thread: &ConversationThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title(),
            message_count: thread.messages.len(),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadError {
    #[error("thread `{0}` does not exist")]
    NotFound(Uuid),
}

/// Abstraction over a conversation storage backend.
pub trait ConversationStore: Send + Sync {
    /// Creates a thread holding `turns`.
    fn start(&self, turns: Vec<ConversationTurn>) -> ConversationThread;
    fn load(&self, id: &Uuid) -> Option<ConversationThread>;
    /// Appends `turns` to an existing thread in one step.
    fn append(
        &self,
        id: &Uuid,
        turns: Vec<ConversationTurn>,
    ) -> Result<ConversationThread, ThreadError>;
    /// Summaries, most recently updated first.
    fn list(&self) -> Vec<ThreadSummary>;
    fn delete(&self, id: &Uuid) -> Result<(), ThreadError>;
}

/// Process-local thread storage.
#[derive(Debug, Default)]
pub struct InMemoryThreadStore {
    threads: DashMap<Uuid, ConversationThread>,
}

impl InMemoryThreadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn stamp(turns: Vec<ConversationTurn>, at: DateTime<Utc>) -> impl Iterator<Item = ThreadMessage> {
    turns.into_iter().map(move |turn| ThreadMessage {
        turn,
        created_at: at,
    })
}

impl ConversationStore for InMemoryThreadStore {
    fn start(&self, turns: Vec<ConversationTurn>) -> ConversationThread {
        let now = Utc::now();
        let thread = ConversationThread {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            messages: stamp(turns, now).collect(),
        };
        self.threads.insert(thread.id, thread.clone());
        tracing::debug!(thread_id = %thread.id, "thread_created");
        thread
    }

    fn load(&self, id: &Uuid) -> Option<ConversationThread> {
        self.threads.get(id).map(|entry| entry.value().clone())
    }

    fn append(
        &self,
        id: &Uuid,
        turns: Vec<ConversationTurn>,
    ) -> Result<ConversationThread, ThreadError> {
        let mut entry = self.threads.get_mut(id).ok_or(ThreadError::NotFound(*id))?;
        let now = Utc::now();
        entry.messages.extend(stamp(turns, now));
        entry.updated_at = now;
        Ok(entry.clone())
    }

    fn list(&self) -> Vec<ThreadSummary> {
        let mut summaries: Vec<ThreadSummary> = self
            .threads
            .iter()
            .map(|entry| ThreadSummary::from(entry.value()))
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        summaries
    }

    fn delete(&self, id: &Uuid) -> Result<(), ThreadError> {
        self.threads
            .remove(id)
            .map(|_| ())
            .ok_or(ThreadError::NotFound(*id))
    }
}
