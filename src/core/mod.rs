//! Core domain logic.

pub mod controller;
pub mod lifecycle;
pub mod session;

pub use controller::{ChatController, Exchange, ReplyDisposition};
pub use lifecycle::{Activation, SessionLifecycle};
pub use session::{HistoryIndex, Message, Sender, SessionRecord};
