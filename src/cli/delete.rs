//! `parley delete` command implementation.

use crate::config::load_config;
use crate::error::{Error, Result};
use crate::storage::{FileBackend, SessionStore};

/// Run the delete command.
///
/// Removes a conversation from the history index. Deletion only ever
/// happens through this explicit action.
///
/// # Errors
///
/// Returns an error if the session is unknown or the storage backend
/// fails.
pub fn run(session_id: &str) -> Result<()> {
    let config = load_config()?;
    let store = FileBackend::new(config.storage.path.clone())?;
    let user = &config.chat.user;

    let mut index = store.load_history(user)?;
    if !index.remove(session_id) {
        return Err(Error::SessionNotFound(session_id.to_string()));
    }
    store.save_history(user, &index)?;

    println!("Deleted conversation {session_id}.");
    Ok(())
}
