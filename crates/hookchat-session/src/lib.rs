//! hookchat-session: Conversation state machine and webhook transport
//!
//! A [`Session`] owns the message log and the idle/awaiting state, and calls
//! a [`Transport`] for exactly one reply per accepted submission.

pub mod events;
pub mod session;
pub mod transport;

pub use events::SessionEvent;
pub use session::{
    DEFAULT_AGENCY_NAME, DEFAULT_CONTEXT_WINDOW, IgnoreReason, Session, SessionConfig,
    SubmitOutcome,
};
pub use transport::{Transport, WebhookTransport};
