//! Session event types

use hookchat_core::{Message, SessionState};
use serde::{Deserialize, Serialize};

/// Events emitted as the conversation changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the history
    MessageAppended { message: Message },

    /// The session moved between idle and awaiting a reply
    StateChanged { state: SessionState },

    /// History was cleared back to the greeting
    Reset { greeting: Message },
}
