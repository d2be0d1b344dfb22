//! `parley list` command implementation.

use crate::config::load_config;
use crate::core::SessionRecord;
use crate::error::Result;
use crate::storage::{FileBackend, SessionStore};
use chrono::{DateTime, Local, Utc};

/// Default number of sessions to show.
const DEFAULT_LIMIT: usize = 20;

/// Maximum length for the first-message preview.
const PREVIEW_LEN: usize = 40;

/// Run the list command.
///
/// Shows archived conversations, most recently updated first. The live
/// conversation, if it is also archived, is marked with `*`.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run(limit: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let store = FileBackend::new(config.storage.path.clone())?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let index = store.load_history(&config.chat.user)?;
    let pointer = store.load_current_pointer(&config.chat.user)?;

    if index.is_empty() {
        println!("No archived conversations.");
        println!(
            "\nConversations are stored in: {}",
            config.storage.path.display()
        );
        return Ok(());
    }

    println!(
        "  {:<20} {:<38} {:>4}  {:<17} First Message",
        "Name", "Session ID", "Msgs", "Updated"
    );
    println!("{}", "─".repeat(110));

    for record in index.entries().iter().take(limit) {
        let live = pointer.as_deref() == Some(record.session_id.as_str());
        println!(
            "{} {:<20} {:<38} {:>4}  {:<17} {}",
            if live { "*" } else { " " },
            record.display_name,
            record.session_id,
            record.messages.len(),
            format_local_time(record.updated_at),
            format_preview(record),
        );
    }

    println!("{}", "─".repeat(110));
    println!("Showing {} conversation(s)", index.len().min(limit));

    Ok(())
}

/// Format UTC time as local time for display.
fn format_local_time(utc: DateTime<Utc>) -> String {
    let local: DateTime<Local> = utc.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// First user message of the conversation, truncated for the table.
fn format_preview(record: &SessionRecord) -> String {
    let first = record
        .messages
        .iter()
        .find(|m| m.sender == crate::core::Sender::User)
        .map_or("(no messages)", |m| m.text.as_str());
    let first_line = first.lines().next().unwrap_or(first);
    if first_line.chars().count() > PREVIEW_LEN {
        let truncated: String = first_line.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Message;

    #[test]
    fn preview_uses_first_user_message() {
        let mut record = SessionRecord::new("greeting");
        record.push(Message::user("how high is 7.8?"));
        record.push(Message::assistant("above target"));
        assert_eq!(format_preview(&record), "how high is 7.8?");
    }

    #[test]
    fn preview_handles_greeting_only_record() {
        let record = SessionRecord::new("greeting");
        assert_eq!(format_preview(&record), "(no messages)");
    }

    #[test]
    fn preview_truncates_long_messages() {
        let mut record = SessionRecord::new("greeting");
        record.push(Message::user("x".repeat(200)));
        let preview = format_preview(&record);
        assert!(preview.chars().count() <= PREVIEW_LEN + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_takes_first_line_only() {
        let mut record = SessionRecord::new("greeting");
        record.push(Message::user("first line\nsecond line"));
        assert_eq!(format_preview(&record), "first line");
    }
}
