//! hookchat-core: Message model, webhook client and reply extraction
//!
//! This crate knows how to talk to a chat webhook and how to turn whatever
//! the webhook sends back into a single string worth showing to a person.

pub mod error;
pub mod extract;
pub mod types;
pub mod webhook;

pub use error::{Error, Result};
pub use extract::{DEFAULT_MAX_DEPTH, PRIORITY_KEYS, extract_reply, extract_reply_with_depth};
pub use types::*;
pub use webhook::{RawPayload, WebhookClient, WebhookRequest};
