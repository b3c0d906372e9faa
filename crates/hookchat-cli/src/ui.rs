//! TUI implementation for hookchat

use crate::commands::{CommandResult, execute_command};
use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use hookchat_session::{Session, SessionEvent, SubmitOutcome};
use hookchat_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ConfirmDialog, ConfirmState, InputBox, MessageList, TypingIndicator,
        message_list::calculate_message_height, spinner::spinner_frame,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;

/// What the event loop should do after an input event
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    /// Start a round trip with this text
    Submit(String),
    Quit,
}

/// TUI application state
pub struct TuiState<'a> {
    session: &'a Session,
    /// Title shown on the conversation border
    title: String,
    input: InputBox,
    /// Current scroll position
    scroll: usize,
    /// Current status message
    status: String,
    theme: Theme,
    /// A submit future is being driven by the loop
    sending: bool,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Confirmation before clearing the conversation
    confirm: ConfirmState,
    /// Output of /help or /history, shown until dismissed
    info: Option<String>,
}

impl<'a> TuiState<'a> {
    pub fn new(session: &'a Session, title: impl Into<String>, theme: Theme) -> Self {
        Self {
            session,
            title: title.into(),
            input: InputBox::new().with_placeholder("Type a message..."),
            scroll: usize::MAX,
            status: "Ready".to_string(),
            theme,
            sending: false,
            spinner_start: Instant::now(),
            confirm: ConfirmState::default(),
            info: None,
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved during render once the content height is known
        self.scroll = usize::MAX;
    }

    fn busy(&self) -> bool {
        self.sending || self.session.is_awaiting_reply()
    }

    /// Mark the start or end of a round trip driven by the loop
    fn set_sending(&mut self, sending: bool) {
        self.sending = sending;
        if sending {
            self.spinner_start = Instant::now();
        }
    }

    /// Apply a session event
    pub fn handle_session_event(&mut self, event: Result<SessionEvent, RecvError>) {
        match event {
            Ok(SessionEvent::MessageAppended { .. }) => self.scroll_to_bottom(),
            Ok(SessionEvent::StateChanged { state }) => {
                self.status = if state.is_idle() {
                    "Ready".to_string()
                } else {
                    "Waiting for reply...".to_string()
                };
            }
            Ok(SessionEvent::Reset { .. }) => {
                self.scroll = 0;
                self.status = "Cleared".to_string();
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "session events lagged");
                self.scroll_to_bottom();
            }
            Err(RecvError::Closed) => {}
        }
    }

    /// Apply one item from the terminal event stream
    pub fn handle_terminal_event(
        &mut self,
        event: Option<std::io::Result<Event>>,
        width: u16,
    ) -> anyhow::Result<Flow> {
        match event {
            Some(Ok(Event::Mouse(mouse))) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(3),
                    MouseEventKind::ScrollDown => self.scroll = self.scroll.saturating_add(3),
                    _ => {}
                }
                Ok(Flow::Continue)
            }
            Some(Ok(event)) => Ok(match event_to_action(event) {
                Some(action) => self.handle_action(action, width),
                None => Flow::Continue,
            }),
            Some(Err(e)) => Err(anyhow::anyhow!("Event error: {}", e)),
            None => Ok(Flow::Quit),
        }
    }

    /// Handle keyboard action
    pub fn handle_action(&mut self, action: Action, width: u16) -> Flow {
        if self.info.is_some() {
            if matches!(
                action,
                Action::Submit | Action::Escape | Action::Interrupt | Action::Char('q')
            ) {
                self.info = None;
            }
            return Flow::Continue;
        }

        if self.confirm.visible {
            if let Some(confirmed) = self.confirm.answer(&action) {
                if confirmed {
                    self.session.reset();
                } else {
                    self.status = "Ready".to_string();
                }
            }
            return Flow::Continue;
        }

        match action {
            Action::Submit => {
                if self.busy() || self.input.is_blank() {
                    return Flow::Continue;
                }
                let text = self.input.take();
                if text.trim_start().starts_with('/') {
                    self.run_command(&text)
                } else {
                    Flow::Submit(text)
                }
            }
            Action::Quit | Action::Interrupt => Flow::Quit,
            Action::ClearConversation => {
                self.confirm.show();
                Flow::Continue
            }
            Action::Escape => {
                self.scroll_to_bottom();
                Flow::Continue
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                Flow::Continue
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                Flow::Continue
            }
            _ => {
                self.input.handle_action(&action, width);
                Flow::Continue
            }
        }
    }

    fn run_command(&mut self, input: &str) -> Flow {
        match execute_command(input, self.session) {
            Some(CommandResult::ConfirmClear) => self.confirm.show(),
            Some(CommandResult::Message(msg)) => self.info = Some(msg),
            Some(CommandResult::Exit) => return Flow::Quit,
            Some(CommandResult::Unknown(cmd)) => {
                self.info = Some(format!(
                    "Unknown command: /{}\nType /help for available commands.",
                    cmd
                ));
            }
            None => {}
        }
        Flow::Continue
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: messages (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);

        let locked = self.busy();
        self.input.set_locked(locked);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);

        if self.confirm.visible {
            ConfirmDialog::new(
                "Clear conversation",
                "Start over? The current conversation will be lost.",
                &self.theme,
            )
            .render_centered(size, frame.buffer_mut());
        }

        if let Some(info) = &self.info {
            self.render_info(frame, size, info);
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.frame_style())
            .title(format!(" {} ", self.title));

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let messages = self.session.messages();
        let typing = self
            .session
            .is_awaiting_reply()
            .then(|| spinner_frame(self.spinner_start));

        let content_height =
            calculate_message_height(&messages, inner.width as usize, typing.is_some());
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let message_list = MessageList::new(&messages, &self.theme)
            .scroll(self.scroll)
            .typing(typing);
        frame.render_widget(message_list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.session.is_awaiting_reply() {
            let spinner = TypingIndicator::new(&self.status, &self.theme)
                .with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let count = self.session.message_count();
        let plural = if count == 1 { "" } else { "s" };
        let left_content = format!("{} │ {} │ {} message{}", self.title, self.status, count, plural);
        let right_content = "Enter: send │ Ctrl+L: clear │ Ctrl+C: quit";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(&left_content, self.theme.muted_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, self.theme.muted_style()),
            ])
        } else {
            Line::from(Span::styled(&left_content, self.theme.muted_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_info(&self, frame: &mut Frame, area: Rect, info: &str) {
        let width = (area.width * 3 / 4).clamp(20.min(area.width), 80.min(area.width));
        let height = (info.lines().count() as u16 + 3).min(area.height);
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        let block = Block::default()
            .title(" Info ")
            .title_bottom(Line::from(" Enter/Esc to close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(self.theme.highlight_style());

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(info)
                .style(self.theme.text_style())
                .wrap(Wrap { trim: false })
                .block(block),
            popup,
        );
    }
}

/// Run the TUI application
pub async fn run_tui(session: &Session, title: &str, theme: Theme) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, session, title, theme).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    session: &Session,
    title: &str,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut state = TuiState::new(session, title, theme);
    let mut session_rx = session.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let mut pending: Option<String> = None;

    loop {
        if let Some(text) = pending.take() {
            state.set_sending(true);
            let mut submit = std::pin::pin!(session.submit(&text));

            // Poll the round trip alongside other events until it resolves
            loop {
                terminal.draw(|frame| state.render(frame))?;
                let width = terminal.size()?.width;

                tokio::select! {
                    biased;

                    outcome = &mut submit => {
                        if let SubmitOutcome::Ignored(reason) = outcome {
                            tracing::debug!(?reason, "submission ignored");
                        }
                        break;
                    }

                    event = session_rx.recv() => state.handle_session_event(event),

                    // Input stays editable while the reply is pending
                    event = event_stream.next() => {
                        if state.handle_terminal_event(event, width)? == Flow::Quit {
                            return Ok(());
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            state.set_sending(false);
            while let Ok(event) = session_rx.try_recv() {
                state.handle_session_event(Ok(event));
            }
            continue;
        }

        terminal.draw(|frame| state.render(frame))?;
        let width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = session_rx.recv() => state.handle_session_event(event),

            event = event_stream.next() => {
                match state.handle_terminal_event(event, width)? {
                    Flow::Continue => {}
                    Flow::Submit(text) => pending = Some(text),
                    Flow::Quit => return Ok(()),
                }
            }

            _ = tick_interval.tick() => {}
        }
    }
}
