//! Transcript and history index types.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The human user.
    User,
    /// The assistant reply.
    Assistant,
}

/// A single transcript message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Who sent the message.
    pub sender: Sender,

    /// Message body.
    pub text: String,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// A named, timestamped transcript.
///
/// The live transcript and every history entry use the same shape; only
/// where the record is stored distinguishes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier.
    pub session_id: String,

    /// Human-readable name, assigned at creation and never changed.
    pub display_name: String,

    /// Chronological, append-only message list.
    pub messages: Vec<Message>,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a fresh session seeded with the greeting message.
    ///
    /// The display name is the local creation time, e.g. `2026-08-07 14:03:21`.
    #[must_use]
    pub fn new(greeting: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            display_name: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            messages: vec![Message::assistant(greeting)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// True when the transcript holds nothing beyond the initial greeting.
    ///
    /// Trivial sessions are never archived, so history is not polluted with
    /// empty conversations.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.messages.len() <= 1
    }
}

/// Ordered archive of one user's sessions, most recently updated first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryIndex {
    entries: Vec<SessionRecord>,
}

impl HistoryIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Archived entries, most recently updated first.
    #[must_use]
    pub fn entries(&self) -> &[SessionRecord] {
        &self.entries
    }

    /// Number of archived sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been archived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by session id.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<&SessionRecord> {
        self.entries.iter().find(|e| e.session_id == session_id)
    }

    /// Insert or replace an entry, keeping at most one per session id.
    ///
    /// Re-archiving an existing id refreshes its messages and `updated_at`
    /// but preserves the `display_name` assigned at the first archive. The
    /// index is re-sorted descending by `updated_at`.
    pub fn upsert(&mut self, record: SessionRecord) {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.session_id == record.session_id)
        {
            let display_name = self.entries[idx].display_name.clone();
            self.entries[idx] = record;
            self.entries[idx].display_name = display_name;
        } else {
            self.entries.push(record);
        }
        self.entries
            .sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
    }

    /// Remove an entry by session id. Returns true if one was removed.
    pub fn remove(&mut self, session_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.session_id != session_id);
        self.entries.len() != before
    }
}
