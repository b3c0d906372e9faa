//! Slash commands for interactive mode

mod history;

pub use history::HistoryCommand;

use hookchat_session::Session;

/// Result of executing a slash command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Ask the user to confirm, then reset the conversation
    ConfirmClear,
    /// Show a message to the user (not sent to the webhook)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command. Returns `None` for ordinary messages.
pub fn execute_command(input: &str, session: &Session) -> Option<CommandResult> {
    let input = input.trim();
    let name = input.strip_prefix('/')?;

    let command = name.split_whitespace().next().unwrap_or("").to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" | "reset" => CommandResult::ConfirmClear,

        "history" => CommandResult::Message(HistoryCommand::execute(session)),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /history             Show the conversation so far
  /clear, /c           Start a fresh conversation (asks first)
  /quit, /exit, /q     Exit hookchat

Anything else is sent to the assistant."#
        .to_string()
}
