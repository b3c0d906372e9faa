//! Yes/no confirmation popup

use crate::{Theme, input::Action};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Widest the popup will grow
const MAX_POPUP_WIDTH: u16 = 60;

/// Visibility of a confirmation prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfirmState {
    pub visible: bool,
}

impl ConfirmState {
    /// Show the prompt
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide the prompt
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Interpret an action while the prompt is open.
    ///
    /// `Some(true)` for y/Enter, `Some(false)` for n/Esc, `None` otherwise.
    /// Any answer closes the prompt.
    pub fn answer(&mut self, action: &Action) -> Option<bool> {
        let answer = match action {
            Action::Char('y') | Action::Char('Y') | Action::Submit => Some(true),
            Action::Char('n') | Action::Char('N') | Action::Escape | Action::Interrupt => {
                Some(false)
            }
            _ => None,
        };
        if answer.is_some() {
            self.hide();
        }
        answer
    }
}

/// A centered popup asking the user to confirm an action
pub struct ConfirmDialog<'a> {
    title: &'a str,
    prompt: &'a str,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, prompt: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            prompt,
            theme,
        }
    }

    /// Render centered within `area`
    pub fn render_centered(self, area: Rect, buf: &mut Buffer) {
        let width = (self.prompt.chars().count() as u16 + 4)
            .max(self.title.chars().count() as u16 + 6)
            .clamp(24, MAX_POPUP_WIDTH)
            .min(area.width);
        let text_width = width.saturating_sub(2).max(1) as usize;
        let prompt_rows = self.prompt.chars().count().div_ceil(text_width) as u16;
        let height = (prompt_rows + 4).min(area.height);

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width, height);

        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.highlight_style().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(self.theme.diagnostic_style());

        let body = vec![
            Line::from(Span::styled(self.prompt, self.theme.text_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", self.theme.diagnostic_style()),
                Span::styled(" yes   ", self.theme.muted_style()),
                Span::styled("[n]", self.theme.highlight_style()),
                Span::styled(" no", self.theme.muted_style()),
            ]),
        ];

        Paragraph::new(body)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(popup, buf);
    }
}
