//! Message list widget for displaying the conversation

use crate::theme::Theme;
use chrono::Local;
use hookchat_core::{Content, Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Indent applied to message bodies
const BODY_INDENT: &str = "  ";

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    scroll: usize,
    /// Spinner frame to show under the last message while a reply is pending
    typing: Option<&'static str>,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            typing: None,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the typing indicator with the given spinner frame
    pub fn typing(mut self, frame: Option<&'static str>) -> Self {
        self.typing = frame;
        self
    }

    fn body_style(&self, msg: &Message) -> Style {
        match (&msg.content, msg.role) {
            (Content::Structured(_), _) => self.theme.payload_style(),
            (Content::Text(text), Role::Assistant) if is_diagnostic(text) => {
                self.theme.diagnostic_style()
            }
            _ => self.theme.text_style(),
        }
    }

    fn render_message(&self, msg: &Message, width: usize) -> Vec<Line<'static>> {
        let (label, style, prefix) = match msg.role {
            Role::User => ("You", self.theme.header_style(Role::User), "▶ "),
            Role::Assistant => ("Assistant", self.theme.header_style(Role::Assistant), "◀ "),
        };
        let time = msg.timestamp.with_timezone(&Local).format("%H:%M");

        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{}{}", prefix, label), style),
            Span::styled(format!("  {}", time), self.theme.muted_style()),
        ])];

        let body_style = self.body_style(msg);
        for line in body_lines(&msg.content, width) {
            lines.push(Line::from(Span::styled(
                format!("{}{}", BODY_INDENT, line),
                body_style,
            )));
        }

        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| self.render_message(msg, width))
            .collect();

        if let Some(frame) = self.typing {
            all_lines.push(Line::from(Span::styled(
                format!("{}{} typing...", BODY_INDENT, frame),
                self.theme.typing_style(),
            )));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Wrapped body lines for a message, before indentation
fn body_lines(content: &Content, width: usize) -> Vec<String> {
    let content_width = width.saturating_sub(BODY_INDENT.len()).max(1);
    match content {
        // Pretty JSON keeps its own line structure; long lines are cut, not wrapped
        Content::Structured(_) => content
            .to_display_string()
            .lines()
            .map(|l| l.chars().take(content_width).collect())
            .collect(),
        Content::Text(text) => textwrap::wrap(text, content_width)
            .into_iter()
            .map(|l| l.into_owned())
            .collect(),
    }
}

/// Transport diagnostics are rendered in the error color
fn is_diagnostic(text: &str) -> bool {
    use hookchat_core::error::{CONNECTION_FAILED_MESSAGE, EMPTY_RESPONSE_MESSAGE, STATUS_ERROR_PREFIX};

    text.starts_with(STATUS_ERROR_PREFIX)
        || text == CONNECTION_FAILED_MESSAGE
        || text == EMPTY_RESPONSE_MESSAGE
}

/// Total rendered height of `messages` at `width`, including the typing line
pub fn calculate_message_height(messages: &[Message], width: usize, typing: bool) -> usize {
    let body: usize = messages
        .iter()
        .map(|msg| 2 + body_lines(&msg.content, width).len())
        .sum();
    body + usize::from(typing)
}
