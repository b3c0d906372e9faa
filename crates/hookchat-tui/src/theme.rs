//! Color themes

use hookchat_core::Role;
use ratatui::style::{Color, Modifier, Style};

/// Colors for the chat window. Fields are named after what they paint.
#[derive(Debug, Clone)]
pub struct Theme {
    pub surface: Color,
    pub text: Color,
    /// Timestamps, placeholders, hints
    pub muted: Color,
    /// Focused input border and cursor
    pub highlight: Color,
    pub user: Color,
    pub assistant: Color,
    /// Transport diagnostics and the clear confirmation
    pub diagnostic: Color,
    pub typing: Color,
    /// Structured (non-text) replies
    pub payload: Color,
    /// Unfocused borders
    pub frame: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            surface: Color::Reset,
            text: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Cyan,
            user: Color::Cyan,
            assistant: Color::Green,
            diagnostic: Color::Red,
            typing: Color::Yellow,
            payload: Color::Magenta,
            frame: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            surface: Color::White,
            text: Color::Black,
            muted: Color::Gray,
            highlight: Color::Blue,
            user: Color::Blue,
            assistant: Color::Rgb(0, 120, 60),
            diagnostic: Color::Rgb(190, 30, 30),
            typing: Color::Rgb(180, 120, 0),
            payload: Color::Rgb(130, 40, 140),
            frame: Color::Gray,
        }
    }

    /// Look a theme up by its config name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Bold header for a message from `role`
    pub fn header_style(&self, role: Role) -> Style {
        let color = match role {
            Role::User => self.user,
            Role::Assistant => self.assistant,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn diagnostic_style(&self) -> Style {
        Style::default().fg(self.diagnostic)
    }

    pub fn typing_style(&self) -> Style {
        Style::default()
            .fg(self.typing)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn payload_style(&self) -> Style {
        Style::default().fg(self.payload)
    }

    pub fn frame_style(&self) -> Style {
        Style::default().fg(self.frame)
    }
}
