//! Storage trait definitions.

use crate::core::{HistoryIndex, SessionRecord};
use crate::error::Result;

/// Persistence backend with three logical slots per user: the history
/// index, the current-session pointer, and the live transcript.
///
/// "Not found" is never an error; only medium-level I/O failure is.
pub trait SessionStore: Send + Sync {
    /// Load a user's history index. Empty if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn load_history(&self, user_id: &str) -> Result<HistoryIndex>;

    /// Overwrite a user's history index. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn save_history(&self, user_id: &str, index: &HistoryIndex) -> Result<()>;

    /// Load the id of the user's live session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn load_current_pointer(&self, user_id: &str) -> Result<Option<String>>;

    /// Record which session is live for the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn save_current_pointer(&self, user_id: &str, session_id: &str) -> Result<()>;

    /// Load the user's live transcript, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn load_current_transcript(&self, user_id: &str) -> Result<Option<SessionRecord>>;

    /// Persist the user's live transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn save_current_transcript(&self, user_id: &str, record: &SessionRecord) -> Result<()>;
}
