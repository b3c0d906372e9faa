use crate::utils::{single_line, truncate_chars};
use hookchat_core::SessionState;
use hookchat_session::Session;

/// Longest preview shown per message
const PREVIEW_CHARS: usize = 60;

pub struct HistoryCommand;

impl HistoryCommand {
    /// Summarize the conversation: count, state, and one line per message
    pub fn execute(session: &Session) -> String {
        let messages = session.messages();
        let state = match session.state() {
            SessionState::Idle => "idle",
            SessionState::AwaitingReply => "awaiting reply",
        };

        let plural = if messages.len() == 1 { "" } else { "s" };
        let mut lines = vec![format!("{} message{} ({})", messages.len(), plural, state)];
        lines.extend(messages.iter().enumerate().map(|(i, m)| {
            let preview = single_line(&m.content.to_context_string());
            format!(
                "  {:>2}. [{}] {}",
                i,
                m.role.as_str(),
                truncate_chars(&preview, PREVIEW_CHARS)
            )
        }));
        lines.join("\n")
    }
}
