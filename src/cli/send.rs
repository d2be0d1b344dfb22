//! `parley send` command implementation.

use crate::config::load_config;
use crate::core::{Activation, ChatController, SessionLifecycle};
use crate::error::Result;
use crate::reply::HttpReplyClient;
use crate::storage::{FileBackend, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// Run the send command.
///
/// Submits a message as the configured user against the live session
/// (resuming the persisted one, or starting fresh), prints the exchange,
/// and archives on the way out.
///
/// # Errors
///
/// Returns an error if storage fails or the reply client cannot be built.
pub fn run(text: &str) -> Result<()> {
    let config = load_config()?;
    let store: Arc<dyn SessionStore> = Arc::new(FileBackend::new(config.storage.path.clone())?);

    let mut lifecycle = SessionLifecycle::new(
        store,
        &config.chat.greeting,
        Duration::from_millis(config.chat.debounce_ms),
    );
    lifecycle.initialize(&config.chat.user, Activation::FirstMount)?;

    let reply = HttpReplyClient::new(
        &config.reply.base_url,
        config.reply.api_key.clone(),
        Duration::from_secs(config.reply.timeout_seconds),
    )?;
    let controller = ChatController::new(Box::new(reply));

    match controller.submit(&mut lifecycle, text)? {
        Some(exchange) => {
            println!("you> {}", exchange.user.text);
            println!("assistant> {}", exchange.assistant.text);
        }
        None => {
            println!("Nothing to send.");
        }
    }

    lifecycle.teardown()
}
