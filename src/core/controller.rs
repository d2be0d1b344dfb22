//! Chat orchestration: user input in, persisted exchange out.

use crate::core::lifecycle::SessionLifecycle;
use crate::core::session::Message;
use crate::error::Result;
use crate::reply::{ReplyClient, ReplyError};
use tracing::debug;

/// A completed submit: the user's message and the assistant message that
/// answered it (real reply or synthetic failure notice).
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The message the user sent.
    pub user: Message,

    /// The assistant message appended in response.
    pub assistant: Message,
}

/// Where a resolved reply ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDisposition {
    /// Appended to the live transcript it was issued against.
    Live,
    /// The live session changed mid-flight; appended to the issued
    /// session's history entry instead.
    Archived,
    /// The issued session no longer exists anywhere; dropped.
    Discarded,
}

/// Drives the reply collaborator and the lifecycle's persistence hooks.
///
/// The controller owns nothing persistent; it only mutates the transcript
/// buffer the lifecycle persists.
pub struct ChatController {
    reply: Box<dyn ReplyClient>,
}

impl ChatController {
    /// Create a controller over a reply collaborator.
    #[must_use]
    pub fn new(reply: Box<dyn ReplyClient>) -> Self {
        Self { reply }
    }

    /// Submit user text: append it, ask the collaborator for a reply, and
    /// deliver the answer.
    ///
    /// Returns `None` without touching anything for empty/whitespace text
    /// or when no session is live. A collaborator failure becomes a
    /// user-visible assistant message; the user's own message stays and the
    /// lifecycle never enters an error state.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting the exchange fails.
    pub fn submit(&self, lifecycle: &mut SessionLifecycle, text: &str) -> Result<Option<Exchange>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let Some(issued_session_id) = lifecycle.current_session_id().map(String::from) else {
            return Ok(None);
        };

        let user_message = Message::user(text);
        lifecycle.append(user_message.clone())?;

        let reply_text = match self.reply.send(text, &issued_session_id) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(session_id = %issued_session_id, error = %e, "reply collaborator failed");
                failure_notice(&e)
            }
        };

        let assistant_message = Message::assistant(reply_text);
        self.deliver_reply(lifecycle, &issued_session_id, assistant_message.clone())?;

        Ok(Some(Exchange {
            user: user_message,
            assistant: assistant_message,
        }))
    }

    /// Deliver a reply tagged with the session it was issued against.
    ///
    /// If that session is still live the reply lands in the live
    /// transcript. If the user switched or started a new session while the
    /// reply was in flight, it is appended to the issued session's history
    /// entry when one exists and discarded otherwise - never misfiled into
    /// the now-different live transcript.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub fn deliver_reply(
        &self,
        lifecycle: &mut SessionLifecycle,
        issued_session_id: &str,
        message: Message,
    ) -> Result<ReplyDisposition> {
        if lifecycle.current_session_id() == Some(issued_session_id) {
            lifecycle.append(message)?;
            return Ok(ReplyDisposition::Live);
        }

        if lifecycle.append_to_history(issued_session_id, message)? {
            debug!(session_id = issued_session_id, "reply delivered to archived session");
            Ok(ReplyDisposition::Archived)
        } else {
            debug!(session_id = issued_session_id, "reply discarded, session gone");
            Ok(ReplyDisposition::Discarded)
        }
    }
}

/// The in-transcript notice shown when the collaborator fails.
fn failure_notice(error: &ReplyError) -> String {
    match error {
        ReplyError::Unauthorized => {
            "I couldn't reach the assistant service because your session is no longer \
             authorized. Please sign in again and resend your message."
                .to_string()
        }
        ReplyError::Server(detail) => {
            format!("The assistant service reported an error ({detail}). Please try again.")
        }
        ReplyError::Network(detail) => {
            format!("I couldn't reach the assistant service ({detail}). Please check your connection and try again.")
        }
    }
}
