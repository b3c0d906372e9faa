//! Conversation state machine
//!
//! ```text
//!            submit(text)                 reply appended
//!   Idle ─────────────────▶ AwaitingReply ───────────────▶ Idle
//!    ▲                          │
//!    └──────── reset() ─────────┘
//! ```
//!
//! Submissions while a reply is pending are dropped, not queued. Failures
//! never surface as a separate state: the transport turns them into ordinary
//! assistant messages and the session goes back to idle.

use std::sync::Arc;

use hookchat_core::{Message, SessionState};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{events::SessionEvent, transport::Transport};

/// Number of prior messages sent as context with each submission
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Agency name used when none is configured
pub const DEFAULT_AGENCY_NAME: &str = "our team";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// First assistant message of every conversation
    pub greeting: String,
    /// How many prior messages accompany a submission
    pub context_window: usize,
}

impl SessionConfig {
    /// Configuration whose greeting welcomes the user to `agency_name`
    pub fn for_agency(agency_name: &str) -> Self {
        Self {
            greeting: format!(
                "Hello! Welcome to {}. How can I assist you today?",
                agency_name
            ),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Set the context window
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_agency(DEFAULT_AGENCY_NAME)
    }
}

/// Why a submission was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Text was empty after trimming
    Blank,
    /// A reply is still pending
    Busy,
}

/// Result of [`Session::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The round trip completed and this reply was appended
    Replied(Message),
    /// Nothing was appended
    Ignored(IgnoreReason),
}

impl SubmitOutcome {
    /// The appended reply, if any
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Replied(message) => Some(message),
            SubmitOutcome::Ignored(_) => None,
        }
    }
}

/// Mutable conversation state, guarded by the session's mutex.
#[derive(Debug)]
struct Conversation {
    messages: Vec<Message>,
    state: SessionState,
    /// Request currently allowed to move the state back to idle
    in_flight: Option<u64>,
    next_request: u64,
}

impl Conversation {
    fn new(greeting: &str) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            state: SessionState::Idle,
            in_flight: None,
            next_request: 0,
        }
    }

    /// The last `window` messages, oldest first
    fn recent(&self, window: usize) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(window);
        self.messages[start..].to_vec()
    }
}

/// A single conversation with a webhook-backed assistant.
///
/// All methods take `&self`; the session can be shared between the task
/// driving a submission and the code rendering it.
pub struct Session {
    config: SessionConfig,
    conversation: Mutex<Conversation>,
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a new session holding only the greeting
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Mutex::new(Conversation::new(&config.greeting)),
            config,
            transport,
            event_tx,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Get the session config
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the history, in display order
    pub fn messages(&self) -> Vec<Message> {
        self.conversation.lock().messages.clone()
    }

    /// Number of messages in the history, greeting included
    pub fn message_count(&self) -> usize {
        self.conversation.lock().messages.len()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.conversation.lock().state
    }

    /// Whether a reply is pending
    pub fn is_awaiting_reply(&self) -> bool {
        self.state() == SessionState::AwaitingReply
    }

    /// Submit user text and wait for the reply.
    ///
    /// Blank text and submissions made while a reply is pending are ignored
    /// without touching the history. Otherwise the user message is appended,
    /// the transport receives the history as it was before that append, and
    /// its reply is appended when it arrives.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Blank);
        }

        let (request_id, history, user_message) = {
            let mut conv = self.conversation.lock();
            if conv.state == SessionState::AwaitingReply {
                tracing::debug!("Ignoring submission while a reply is pending");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }

            let history = conv.recent(self.config.context_window);
            let user_message = Message::user(text);
            conv.messages.push(user_message.clone());
            conv.state = SessionState::AwaitingReply;
            conv.next_request += 1;
            let request_id = conv.next_request;
            conv.in_flight = Some(request_id);
            (request_id, history, user_message)
        };

        self.emit(SessionEvent::MessageAppended {
            message: user_message,
        });
        self.emit(SessionEvent::StateChanged {
            state: SessionState::AwaitingReply,
        });

        tracing::debug!(request_id, context = history.len(), "Sending message");
        let reply_text = self.transport.send_message(text, &history).await;
        let reply = Message::assistant(reply_text);

        let now_idle = {
            let mut conv = self.conversation.lock();
            conv.messages.push(reply.clone());
            // A reset (and possibly a newer submission) may have happened
            // while this request was out; only the current one settles state.
            if conv.in_flight == Some(request_id) {
                conv.in_flight = None;
                conv.state = SessionState::Idle;
                true
            } else {
                false
            }
        };

        self.emit(SessionEvent::MessageAppended {
            message: reply.clone(),
        });
        if now_idle {
            self.emit(SessionEvent::StateChanged {
                state: SessionState::Idle,
            });
        }

        SubmitOutcome::Replied(reply)
    }

    /// Clear the history back to a fresh greeting and force the state to idle.
    ///
    /// Asking the user for confirmation is up to the caller.
    pub fn reset(&self) {
        let greeting = {
            let mut conv = self.conversation.lock();
            if conv.in_flight.is_some() {
                tracing::debug!("Reset while a reply is pending; it will still be appended");
            }
            let next_request = conv.next_request;
            *conv = Conversation {
                next_request,
                ..Conversation::new(&self.config.greeting)
            };
            conv.messages[0].clone()
        };

        self.emit(SessionEvent::Reset { greeting });
        self.emit(SessionEvent::StateChanged {
            state: SessionState::Idle,
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hookchat_core::Role;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    /// Echoes the user text back and records the history it was given.
    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Vec<Message>)>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send_message(&self, user_text: &str, recent_history: &[Message]) -> String {
            self.calls
                .lock()
                .push((user_text.to_string(), recent_history.to_vec()));
            format!("echo: {}", user_text)
        }
    }

    /// Holds each reply until the test releases it by user text.
    #[derive(Default)]
    struct GatedTransport {
        started: Notify,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        calls: Mutex<usize>,
    }

    impl GatedTransport {
        fn gate(&self, user_text: &str) -> Arc<Notify> {
            self.gates
                .lock()
                .entry(user_text.to_string())
                .or_default()
                .clone()
        }

        fn release(&self, user_text: &str) {
            self.gate(user_text).notify_one();
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send_message(&self, user_text: &str, _recent_history: &[Message]) -> String {
            *self.calls.lock() += 1;
            let gate = self.gate(user_text);
            self.started.notify_one();
            gate.notified().await;
            format!("late: {}", user_text)
        }
    }

    fn make_session(transport: Arc<dyn Transport>) -> Session {
        Session::new(SessionConfig::for_agency("Acme"), transport)
    }

    #[test]
    fn test_starts_with_greeting_only() {
        let session = make_session(Arc::new(RecordingTransport::default()));
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(
            messages[0].text(),
            Some("Hello! Welcome to Acme. How can I assist you today?")
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_round_trip_appends_user_then_reply() {
        let transport = Arc::new(RecordingTransport::default());
        let session = make_session(transport.clone());

        let outcome = session.submit("  Need a website  ").await;
        assert_eq!(outcome.reply().and_then(|m| m.text()), Some("echo: Need a website"));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].text(), Some("Need a website"));
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_blank_submission_ignored() {
        let transport = Arc::new(RecordingTransport::default());
        let session = make_session(transport.clone());

        assert_eq!(
            session.submit("   \n").await,
            SubmitOutcome::Ignored(IgnoreReason::Blank)
        );
        assert_eq!(session.message_count(), 1);
        assert!(transport.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_pre_append_snapshot() {
        let transport = Arc::new(RecordingTransport::default());
        let session = make_session(transport.clone());

        session.submit("first").await;

        let calls = transport.calls.lock();
        let (text, history) = &calls[0];
        assert_eq!(text, "first");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_history_truncated_to_window() {
        let transport = Arc::new(RecordingTransport::default());
        let session = make_session(transport.clone());

        for i in 0..4 {
            session.submit(&format!("message {}", i)).await;
        }
        assert_eq!(session.message_count(), 9);
        session.submit("last").await;

        let calls = transport.calls.lock();
        let (_, history) = calls.last().unwrap();
        let expected: Vec<_> = session.messages()[4..9].to_vec();
        assert_eq!(history.len(), DEFAULT_CONTEXT_WINDOW);
        assert_eq!(history, &expected);
    }

    #[tokio::test]
    async fn test_custom_context_window() {
        let transport = Arc::new(RecordingTransport::default());
        let session = Session::new(
            SessionConfig::default().with_context_window(2),
            transport.clone(),
        );

        session.submit("a").await;
        session.submit("b").await;

        let calls = transport.calls.lock();
        assert_eq!(calls[1].1.len(), 2);
        assert_eq!(calls[1].1[0].text(), Some("a"));
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_noop() {
        let transport = Arc::new(GatedTransport::default());
        let session = make_session(transport.clone());

        let first = session.submit("one");
        let second = async {
            transport.started.notified().await;
            assert_eq!(session.state(), SessionState::AwaitingReply);
            let len_before = session.message_count();
            let outcome = session.submit("two").await;
            assert_eq!(session.message_count(), len_before);
            transport.release("one");
            outcome
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(second, SubmitOutcome::Ignored(IgnoreReason::Busy));
        assert_eq!(first.reply().and_then(|m| m.text()), Some("late: one"));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages.iter().filter(|m| m.role == Role::Assistant).count(),
            2
        );
        assert_eq!(*transport.calls.lock(), 1);
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_reset_after_exchanges() {
        let session = make_session(Arc::new(RecordingTransport::default()));
        for text in ["a", "b", "c"] {
            session.submit(text).await;
        }
        assert_eq!(session.message_count(), 7);

        session.reset();
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].text(),
            Some("Hello! Welcome to Acme. How can I assist you today?")
        );
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_reset_during_flight_still_appends_reply() {
        let transport = Arc::new(GatedTransport::default());
        let session = make_session(transport.clone());

        let first = session.submit("one");
        let resetter = async {
            transport.started.notified().await;
            session.reset();
            assert!(session.state().is_idle());
            assert_eq!(session.message_count(), 1);
            transport.release("one");
        };

        let (outcome, _) = tokio::join!(first, resetter);
        assert!(outcome.reply().is_some());

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text(), Some("late: one"));
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_stale_reply_does_not_clear_newer_request() {
        let transport = Arc::new(GatedTransport::default());
        let session = make_session(transport.clone());

        let first = session.submit("one");
        let driver = async {
            transport.started.notified().await;
            session.reset();

            let second = session.submit("two");
            let check = async {
                transport.started.notified().await;
                transport.release("one");
                while session.message_count() < 3 {
                    tokio::task::yield_now().await;
                }
                // The stale reply landed but "two" is still pending.
                assert_eq!(session.state(), SessionState::AwaitingReply);
                transport.release("two");
            };
            let (outcome, _) = tokio::join!(second, check);
            outcome
        };

        let (first, second) = tokio::join!(first, driver);
        assert_eq!(first.reply().and_then(|m| m.text()), Some("late: one"));
        assert_eq!(second.reply().and_then(|m| m.text()), Some("late: two"));
        assert_eq!(*transport.calls.lock(), 2);
        assert_eq!(session.message_count(), 4);
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_events_emitted_in_order() {
        let session = make_session(Arc::new(RecordingTransport::default()));
        let mut rx = session.subscribe();

        session.submit("hello").await;
        session.reset();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                SessionEvent::MessageAppended { message } => message.role.as_str().to_string(),
                SessionEvent::StateChanged { state } => format!("{:?}", state),
                SessionEvent::Reset { .. } => "reset".to_string(),
            });
        }
        assert_eq!(
            kinds,
            vec!["user", "AwaitingReply", "assistant", "Idle", "reset", "Idle"]
        );
    }
}
