//! Custom widgets for the TUI

pub mod confirm;
pub mod input_box;
pub mod message_list;
pub mod spinner;

pub use confirm::{ConfirmDialog, ConfirmState};
pub use input_box::InputBox;
pub use message_list::MessageList;
pub use spinner::TypingIndicator;
