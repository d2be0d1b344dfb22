//! In-memory storage backend for testing and embedding.

use crate::core::{HistoryIndex, SessionRecord};
use crate::error::Result;
use crate::storage::traits::SessionStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend.
///
/// Keeps every user's slots in process memory so tests and embedded hosts
/// do not collide through ambient global state.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RwLock<HashMap<String, UserSlots>>,
}

#[derive(Debug, Default, Clone)]
struct UserSlots {
    history: HistoryIndex,
    pointer: Option<String>,
    transcript: Option<SessionRecord>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryBackend {
    fn load_history(&self, user_id: &str) -> Result<HistoryIndex> {
        let slots = self.slots.read().unwrap();
        Ok(slots
            .get(user_id)
            .map(|s| s.history.clone())
            .unwrap_or_default())
    }

    fn save_history(&self, user_id: &str, index: &HistoryIndex) -> Result<()> {
        let mut slots = self.slots.write().unwrap();
        slots.entry(user_id.to_string()).or_default().history = index.clone();
        Ok(())
    }

    fn load_current_pointer(&self, user_id: &str) -> Result<Option<String>> {
        let slots = self.slots.read().unwrap();
        Ok(slots.get(user_id).and_then(|s| s.pointer.clone()))
    }

    fn save_current_pointer(&self, user_id: &str, session_id: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap();
        slots.entry(user_id.to_string()).or_default().pointer = Some(session_id.to_string());
        Ok(())
    }

    fn load_current_transcript(&self, user_id: &str) -> Result<Option<SessionRecord>> {
        let slots = self.slots.read().unwrap();
        Ok(slots.get(user_id).and_then(|s| s.transcript.clone()))
    }

    fn save_current_transcript(&self, user_id: &str, record: &SessionRecord) -> Result<()> {
        let mut slots = self.slots.write().unwrap();
        slots.entry(user_id.to_string()).or_default().transcript = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Message;

    #[test]
    fn history_absent_is_empty() {
        let store = MemoryBackend::new();
        assert!(store.load_history("u1").unwrap().is_empty());
    }

    #[test]
    fn pointer_round_trip() {
        let store = MemoryBackend::new();
        assert!(store.load_current_pointer("u1").unwrap().is_none());

        store.save_current_pointer("u1", "s-1").unwrap();
        assert_eq!(
            store.load_current_pointer("u1").unwrap().as_deref(),
            Some("s-1")
        );
    }

    #[test]
    fn transcript_round_trip() {
        let store = MemoryBackend::new();
        let mut record = SessionRecord::new("hi");
        record.push(Message::user("hello"));

        store.save_current_transcript("u1", &record).unwrap();

        let loaded = store.load_current_transcript("u1").unwrap().unwrap();
        assert_eq!(loaded.messages, record.messages);
    }

    #[test]
    fn users_do_not_collide() {
        let store = MemoryBackend::new();
        store.save_current_pointer("alice", "s-alice").unwrap();
        store.save_current_pointer("bob", "s-bob").unwrap();

        assert_eq!(
            store.load_current_pointer("alice").unwrap().as_deref(),
            Some("s-alice")
        );
        assert_eq!(
            store.load_current_pointer("bob").unwrap().as_deref(),
            Some("s-bob")
        );
        assert!(store.load_current_pointer("carol").unwrap().is_none());
    }

    #[test]
    fn save_history_overwrites() {
        let store = MemoryBackend::new();
        let mut index = HistoryIndex::new();
        index.upsert(SessionRecord::new("hi"));
        store.save_history("u1", &index).unwrap();

        store.save_history("u1", &HistoryIndex::new()).unwrap();
        assert!(store.load_history("u1").unwrap().is_empty());
    }

    #[test]
    fn concurrent_reads_and_writes() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryBackend::new());
        store.save_current_pointer("shared", "s-0").unwrap();

        let mut handles = vec![];
        for i in 0..5 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..50 {
                    let user = format!("writer-{i}");
                    store_clone
                        .save_current_pointer(&user, &format!("s-{j}"))
                        .unwrap();
                }
            }));
        }
        for _ in 0..5 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    assert!(store_clone.load_current_pointer("shared").unwrap().is_some());
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }
    }
}
