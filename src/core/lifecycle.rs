//! Session lifecycle state machine.
//!
//! Governs the transitions between the live transcript and the archived
//! history: resuming or recreating on activation, archiving on explicit
//! user actions and on view teardown, and scheduling debounced transcript
//! writes so appends do not hammer the storage medium.

use crate::core::session::{HistoryIndex, Message, SessionRecord};
use crate::error::{Error, Result};
use crate::storage::SessionStore;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How the host view came to life.
///
/// Emitted explicitly by the owning application shell when the session view
/// activates, instead of being inferred from component first-render
/// tracking. `FirstMount` covers fresh process starts and genuine page
/// reloads; `Remount` covers a view being recreated while the app session
/// continues (e.g. tab navigation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// First activation of this app session.
    FirstMount,
    /// Re-activation after navigating away and back.
    Remount,
}

enum State {
    Uninitialized,
    Live {
        user_id: String,
        record: SessionRecord,
    },
    /// Transient while a switch archives the old transcript and loads the
    /// new one.
    Switching,
}

/// The lifecycle manager for one user's conversation sessions.
///
/// All operations are synchronous and run to completion; the only
/// scheduling involved is the debounced transcript write, which the host
/// event loop drives via [`SessionLifecycle::poll`].
pub struct SessionLifecycle {
    store: Arc<dyn SessionStore>,
    greeting: String,
    debounce: Duration,
    state: State,
    pending_flush: Option<Instant>,
}

impl SessionLifecycle {
    /// Create an uninitialized lifecycle over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, greeting: impl Into<String>, debounce: Duration) -> Self {
        Self {
            store,
            greeting: greeting.into(),
            debounce,
            state: State::Uninitialized,
            pending_flush: None,
        }
    }

    /// Bind to a user and establish a live session.
    ///
    /// Reads the persisted pointer/transcript and decides between resuming
    /// and archive-then-recreate:
    ///
    /// - persisted transcript + `FirstMount` + non-empty history: resume it
    ///   directly;
    /// - persisted non-trivial transcript + `Remount`: archive it, then
    ///   start fresh;
    /// - otherwise start fresh. A non-trivial persisted transcript is
    ///   always archived before being replaced, never discarded.
    ///
    /// Unreadable slots are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if already initialized, or a storage
    /// error if the fresh session cannot be persisted.
    pub fn initialize(&mut self, user_id: &str, activation: Activation) -> Result<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(Error::InvalidState(
                "lifecycle is already initialized".to_string(),
            ));
        }

        let history = self.store.load_history(user_id).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "history unreadable, treating as empty");
            HistoryIndex::new()
        });
        let persisted = self
            .store
            .load_current_transcript(user_id)
            .unwrap_or_else(|e| {
                warn!(user_id, error = %e, "live transcript unreadable, treating as absent");
                None
            });

        // The transcript is authoritative; a stale pointer only gets logged.
        if let Ok(Some(pointer)) = self.store.load_current_pointer(user_id) {
            if persisted.as_ref().is_some_and(|r| r.session_id != pointer) {
                warn!(user_id, %pointer, "current pointer does not match persisted transcript");
            }
        }

        match (persisted, activation) {
            (Some(record), Activation::FirstMount) if !history.is_empty() => {
                debug!(user_id, session_id = %record.session_id, "resuming live session");
                self.store.save_current_pointer(user_id, &record.session_id)?;
                self.state = State::Live {
                    user_id: user_id.to_string(),
                    record,
                };
                Ok(())
            }
            (Some(record), _) => {
                if !record.is_trivial() {
                    debug!(user_id, session_id = %record.session_id, "archiving stale live session");
                    self.archive(user_id, &record)?;
                }
                self.start_fresh(user_id)
            }
            (None, _) => self.start_fresh(user_id),
        }
    }

    /// The live transcript, if initialized.
    #[must_use]
    pub fn current(&self) -> Option<&SessionRecord> {
        match &self.state {
            State::Live { record, .. } => Some(record),
            _ => None,
        }
    }

    /// The live session id, if initialized.
    #[must_use]
    pub fn current_session_id(&self) -> Option<&str> {
        self.current().map(|r| r.session_id.as_str())
    }

    /// Archive the current transcript if non-trivial and start a fresh
    /// greeting-only session.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` without a live session, or a storage
    /// error from the synchronous persistence writes.
    pub fn create_new(&mut self) -> Result<()> {
        let (user_id, record) = match &self.state {
            State::Live { user_id, record } => (user_id.clone(), record.clone()),
            _ => {
                return Err(Error::InvalidState(
                    "create_new requires a live session".to_string(),
                ));
            }
        };

        self.pending_flush = None;
        if !record.is_trivial() {
            self.archive(&user_id, &record)?;
        }
        debug!(user_id = %user_id, from = %record.session_id, "starting new session");
        self.start_fresh(&user_id)
    }

    /// Make an archived session the live transcript.
    ///
    /// The current transcript is archived first if non-trivial; the target
    /// entry stays in the index, with its messages copied into the live
    /// slot. Archiving the old and finding the new happen against the same
    /// index read, so the pair is a single read-modify-write.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the target is not in the index
    /// (the live state is left untouched), `Error::InvalidState` without a
    /// live session, or a storage error.
    pub fn switch_to(&mut self, target_session_id: &str) -> Result<()> {
        match mem::replace(&mut self.state, State::Switching) {
            State::Live { user_id, record } => {
                self.pending_flush = None;
                match self.load_target(&user_id, &record, target_session_id) {
                    Ok(target) => {
                        debug!(user_id = %user_id, from = %record.session_id, to = %target.session_id, "switched session");
                        self.state = State::Live {
                            user_id,
                            record: target,
                        };
                        Ok(())
                    }
                    Err(e) => {
                        self.state = State::Live { user_id, record };
                        Err(e)
                    }
                }
            }
            other => {
                self.state = other;
                Err(Error::InvalidState(
                    "switch_to requires a live session".to_string(),
                ))
            }
        }
    }

    /// Append a message to the live transcript and schedule a debounced
    /// transcript write.
    ///
    /// The write happens once the debounce window passes without further
    /// appends; drive it with [`SessionLifecycle::poll`]. Transitions and
    /// [`SessionLifecycle::teardown`] flush synchronously instead.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` without a live session.
    pub fn append(&mut self, message: Message) -> Result<()> {
        match &mut self.state {
            State::Live { record, .. } => {
                record.push(message);
                self.pending_flush = Some(Instant::now() + self.debounce);
                Ok(())
            }
            _ => Err(Error::InvalidState(
                "append requires a live session".to_string(),
            )),
        }
    }

    /// Flush the scheduled transcript write if its debounce deadline has
    /// passed. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        match self.pending_flush {
            Some(due) if now >= due => {
                self.flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Cancel any scheduled write and persist the live transcript now.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn flush(&mut self) -> Result<()> {
        self.pending_flush = None;
        if let State::Live { user_id, record } = &self.state {
            self.store.save_current_transcript(user_id, record)?;
        }
        Ok(())
    }

    /// Tear down on view deactivation.
    ///
    /// Cancels the debounce, writes the transcript synchronously, and
    /// archives it if non-trivial. The pointer and transcript slots are
    /// left persisted as-is so the next [`SessionLifecycle::initialize`]
    /// can decide between resume and archive-then-recreate. A teardown
    /// without a live session is a no-op (deactivation events can repeat).
    ///
    /// # Errors
    ///
    /// Returns a storage error if a write fails.
    pub fn teardown(&mut self) -> Result<()> {
        self.flush()?;
        match mem::replace(&mut self.state, State::Uninitialized) {
            State::Live { user_id, record } => {
                if !record.is_trivial() {
                    self.archive(&user_id, &record)?;
                }
                debug!(user_id = %user_id, session_id = %record.session_id, "lifecycle torn down");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The bound user's history index.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` without a live session, or a storage
    /// error.
    pub fn history(&self) -> Result<HistoryIndex> {
        match &self.state {
            State::Live { user_id, .. } => self.store.load_history(user_id),
            _ => Err(Error::InvalidState(
                "history requires a live session".to_string(),
            )),
        }
    }

    /// Append a message directly to an archived entry, bypassing the live
    /// transcript. Returns false when the id is not in the index.
    ///
    /// Used for replies that resolve after the session they were issued
    /// against stopped being live.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` without a live session, or a storage
    /// error.
    pub fn append_to_history(&mut self, session_id: &str, message: Message) -> Result<bool> {
        let user_id = match &self.state {
            State::Live { user_id, .. } => user_id.clone(),
            _ => {
                return Err(Error::InvalidState(
                    "append_to_history requires a live session".to_string(),
                ));
            }
        };

        let mut index = self.store.load_history(&user_id)?;
        let Some(mut entry) = index.get(session_id).cloned() else {
            return Ok(false);
        };
        entry.push(message);
        index.upsert(entry);
        self.store.save_history(&user_id, &index)?;
        Ok(true)
    }

    /// Create, persist, and go live with a greeting-only session.
    fn start_fresh(&mut self, user_id: &str) -> Result<()> {
        let record = SessionRecord::new(&self.greeting);
        self.store.save_current_pointer(user_id, &record.session_id)?;
        self.store.save_current_transcript(user_id, &record)?;
        debug!(user_id, session_id = %record.session_id, "fresh session live");
        self.state = State::Live {
            user_id: user_id.to_string(),
            record,
        };
        Ok(())
    }

    /// Read-modify-write the history index: upsert `record` if non-trivial.
    fn archive(&self, user_id: &str, record: &SessionRecord) -> Result<()> {
        let mut index = self.store.load_history(user_id)?;
        index.upsert(record.clone());
        self.store.save_history(user_id, &index)
    }

    /// Archive the outgoing transcript and pull the target out of the same
    /// index read, then persist the new live state.
    fn load_target(
        &self,
        user_id: &str,
        outgoing: &SessionRecord,
        target_session_id: &str,
    ) -> Result<SessionRecord> {
        let mut index = self.store.load_history(user_id)?;
        if !outgoing.is_trivial() {
            index.upsert(outgoing.clone());
        }
        let target = index
            .get(target_session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(target_session_id.to_string()))?;
        self.store.save_history(user_id, &index)?;
        self.store.save_current_pointer(user_id, &target.session_id)?;
        self.store.save_current_transcript(user_id, &target)?;
        Ok(target)
    }
}
