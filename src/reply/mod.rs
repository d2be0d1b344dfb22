//! The reply collaborator seam.

pub mod http;

pub use http::HttpReplyClient;

use thiserror::Error;

/// Failures from the reply collaborator.
///
/// These never propagate through lifecycle state; the controller turns them
/// into in-transcript notices.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The caller's credentials were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("server error: {0}")]
    Server(String),

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),
}

/// External collaborator that turns user text into a reply.
pub trait ReplyClient: Send + Sync {
    /// Request a reply for `text` within the given session.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplyError`] when the collaborator cannot answer.
    fn send(&self, text: &str, session_id: &str) -> Result<String, ReplyError>;
}
