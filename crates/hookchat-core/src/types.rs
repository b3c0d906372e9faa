//! Core types for webhook conversations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Message body: plain text, or a structured value for non-text payloads
///
/// The webhook transport always yields text. `Structured` is for callers that
/// build messages themselves and for the presentation layer, which
/// pretty-prints it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Text content
    Text(String),
    /// Arbitrary JSON mapping or sequence
    Structured(serde_json::Value),
}

impl Content {
    /// Create text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Get text if this is text content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Single-line form used when flattening history into the request context
    pub fn to_context_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }

    /// Form shown to a reader: text verbatim, structured values pretty-printed
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A single entry in the conversation log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: Content) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Content::text(text))
    }

    /// Create an assistant message with text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::text(text))
    }

    /// Create an assistant message carrying a structured value.
    ///
    /// Not produced by the webhook path, which reduces every payload to text.
    pub fn assistant_value(value: serde_json::Value) -> Self {
        Self::new(Role::Assistant, Content::Structured(value))
    }

    /// Text if this message carries text content
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Observable state of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for the next submission
    #[default]
    Idle,
    /// A webhook call is in flight; new submissions are ignored
    AwaitingReply,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// Flatten messages into `"<role>: <content> | <role>: <content>"`.
///
/// Only role and content go over the wire; ids and timestamps stay local.
pub fn flatten_context(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content.to_context_string()))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_context_format() {
        let messages = vec![Message::assistant("Hi there"), Message::user("I need a quote")];
        assert_eq!(
            flatten_context(&messages),
            "assistant: Hi there | user: I need a quote"
        );
    }

    #[test]
    fn test_flatten_context_empty() {
        assert_eq!(flatten_context(&[]), "");
    }

    #[test]
    fn test_flatten_context_structured_is_compact_json() {
        let messages = vec![Message::assistant_value(json!({"items": [1, 2]}))];
        assert_eq!(flatten_context(&messages), r#"assistant: {"items":[1,2]}"#);
    }

    #[test]
    fn test_assistant_value_has_no_text() {
        let message = Message::assistant_value(json!(["a", "b"]));
        assert_eq!(message.role, Role::Assistant);
        assert!(message.text().is_none());
        assert_eq!(message.content.to_display_string(), "[\n  \"a\",\n  \"b\"\n]");
    }

    #[test]
    fn test_message_ids_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_content_serde_untagged() {
        let text: Content = serde_json::from_value(json!("hello")).unwrap();
        assert_eq!(text, Content::text("hello"));

        let structured: Content = serde_json::from_value(json!({"a": 1})).unwrap();
        assert!(structured.as_text().is_none());
    }

    #[test]
    fn test_display_string_pretty_prints_structured() {
        let content = Content::Structured(json!({"a": 1}));
        assert_eq!(content.to_display_string(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), json!("assistant"));
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_default_state_is_idle() {
        assert!(SessionState::default().is_idle());
        assert!(!SessionState::AwaitingReply.is_idle());
    }
}
