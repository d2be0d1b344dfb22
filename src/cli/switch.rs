//! `parley switch` command implementation.

use crate::config::load_config;
use crate::core::{Activation, SessionLifecycle};
use crate::error::Result;
use crate::storage::{FileBackend, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// Run the switch command.
///
/// Archives the current conversation (if it has content) and makes an
/// archived one live again.
///
/// # Errors
///
/// Returns an error if the target session is unknown or the storage
/// backend fails.
pub fn run(session_id: &str) -> Result<()> {
    let config = load_config()?;
    let store: Arc<dyn SessionStore> = Arc::new(FileBackend::new(config.storage.path.clone())?);

    let mut lifecycle = SessionLifecycle::new(
        store,
        &config.chat.greeting,
        Duration::from_millis(config.chat.debounce_ms),
    );
    lifecycle.initialize(&config.chat.user, Activation::FirstMount)?;
    lifecycle.switch_to(session_id)?;

    if let Some(record) = lifecycle.current() {
        println!(
            "Switched to conversation {} ({}), {} message(s)",
            record.display_name,
            record.session_id,
            record.messages.len()
        );
    }

    lifecycle.teardown()
}
