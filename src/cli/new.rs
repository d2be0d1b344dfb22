//! `parley new` command implementation.

use crate::config::load_config;
use crate::core::{Activation, SessionLifecycle};
use crate::error::Result;
use crate::storage::{FileBackend, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// Run the new command.
///
/// Archives the current conversation (if it has content) and starts a
/// fresh one.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run() -> Result<()> {
    let config = load_config()?;
    let store: Arc<dyn SessionStore> = Arc::new(FileBackend::new(config.storage.path.clone())?);

    let mut lifecycle = SessionLifecycle::new(
        store,
        &config.chat.greeting,
        Duration::from_millis(config.chat.debounce_ms),
    );
    lifecycle.initialize(&config.chat.user, Activation::FirstMount)?;
    lifecycle.create_new()?;

    if let Some(record) = lifecycle.current() {
        println!(
            "Started new conversation {} ({})",
            record.display_name, record.session_id
        );
    }

    lifecycle.teardown()
}
