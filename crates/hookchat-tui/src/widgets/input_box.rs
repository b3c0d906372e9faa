//! Text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line message composer
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    /// Horizontal scroll offset (in display width)
    scroll: usize,
    placeholder: String,
    /// Dimmed while a reply is pending
    locked: bool,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Dim the box and hide the cursor while sending is unavailable
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the content is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Take the content, leaving the box empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll = 0;
        std::mem::take(&mut self.content)
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.take();
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn width_before_cursor(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Remove the character at `char_index`, if any
    fn remove_char(&mut self, char_index: usize) -> bool {
        let start = self.byte_offset(char_index);
        match self.content[start..].chars().next() {
            Some(c) => {
                self.content.drain(start..start + c.len_utf8());
                true
            }
            None => false,
        }
    }

    /// Handle an editing action. Returns true if the content or cursor changed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let char_count = self.content.chars().count();

        let changed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_char(self.cursor)
            }
            Action::Delete if self.cursor < char_count => self.remove_char(self.cursor),
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < char_count => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = char_count;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                let (from, to) = (self.byte_offset(start), self.byte_offset(self.cursor));
                self.content.drain(from..to);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                // Single-line input: newlines collapse to one space
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content.ends_with(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if changed {
            self.update_scroll(width as usize);
        }
        changed
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn update_scroll(&mut self, width: usize) {
        let visible_width = width.saturating_sub(4); // borders + padding
        let cursor_pos = self.width_before_cursor();

        if cursor_pos < self.scroll {
            self.scroll = cursor_pos;
        } else if cursor_pos >= self.scroll + visible_width {
            self.scroll = cursor_pos + 1 - visible_width;
        }
    }

    /// The slice of content that fits in `visible_width` after scrolling
    fn visible_text(&self, visible_width: usize) -> String {
        let mut skipped = 0;
        let mut used = 0;
        let mut out = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > visible_width {
                break;
            }
            out.push(c);
            used += w;
        }
        out
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.locked {
                theme.frame_style()
            } else {
                theme.highlight_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.muted_style())
        } else if self.locked {
            (self.visible_text(inner.width as usize), theme.muted_style())
        } else {
            (self.visible_text(inner.width as usize), theme.text_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if !self.locked && inner.width > 0 {
            let cursor_x = self.width_before_cursor().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + cursor_x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.highlight));
                }
            }
        }
    }
}
