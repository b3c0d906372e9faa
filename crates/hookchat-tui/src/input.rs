//! Key bindings for the chat window

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means to the chat window.
///
/// Editing actions go to the input box; the rest are handled by the event
/// loop. Confirmation prompts read `Char('y')`/`Char('n')`, `Submit` and
/// `Escape` directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Editing
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Ctrl+U
    ClearLine,
    /// Ctrl+W
    DeleteWord,
    /// Bracketed paste
    Paste(String),

    // Conversation
    /// Enter: send the composed message
    Submit,
    /// Ctrl+L: ask to start over
    ClearConversation,
    PageUp,
    PageDown,
    Escape,

    // Leaving
    /// Ctrl+C
    Interrupt,
    /// Ctrl+Q or Ctrl+D
    Quit,

    /// Anything without a binding, including key releases
    Unknown,
}

/// Map a key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    if event.kind == KeyEventKind::Release {
        return Action::Unknown;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);

    match (ctrl, alt, event.code) {
        (true, _, KeyCode::Char('c')) => Action::Interrupt,
        (true, _, KeyCode::Char('q' | 'd')) => Action::Quit,
        (true, _, KeyCode::Char('l')) => Action::ClearConversation,
        (true, _, KeyCode::Char('u')) => Action::ClearLine,
        (true, _, KeyCode::Char('w')) => Action::DeleteWord,
        (true, _, _) | (false, true, _) => Action::Unknown,
        (false, false, code) => match code {
            KeyCode::Enter => Action::Submit,
            KeyCode::Char(c) => Action::Char(c),
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Delete => Action::Delete,
            KeyCode::Left => Action::Left,
            KeyCode::Right => Action::Right,
            KeyCode::Home => Action::Home,
            KeyCode::End => Action::End,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::Esc => Action::Escape,
            _ => Action::Unknown,
        },
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}
