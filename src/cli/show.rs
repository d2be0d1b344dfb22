//! `parley show` command implementation.

use crate::config::load_config;
use crate::core::{Sender, SessionRecord};
use crate::error::{Error, Result};
use crate::storage::{FileBackend, SessionStore};

/// Run the show command.
///
/// Prints the transcript of a conversation: the live one if the id
/// matches, otherwise the archived entry.
///
/// # Errors
///
/// Returns an error if the session is unknown or the storage backend
/// fails.
pub fn run(session_id: &str) -> Result<()> {
    let config = load_config()?;
    let store = FileBackend::new(config.storage.path.clone())?;
    let user = &config.chat.user;

    let live = store
        .load_current_transcript(user)
        .unwrap_or_default()
        .filter(|r| r.session_id == session_id);
    let record = match live {
        Some(record) => record,
        None => store
            .load_history(user)?
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?,
    };

    print_transcript(&record);
    Ok(())
}

fn print_transcript(record: &SessionRecord) {
    println!("{} ({})", record.display_name, record.session_id);
    println!(
        "Created: {}  Updated: {}",
        record.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
        record.updated_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!();
    for message in &record.messages {
        let label = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        println!("{label}> {}", message.text);
    }
}
