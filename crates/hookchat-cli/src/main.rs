//! hookchat - terminal chat client for webhook-backed assistants

mod commands;
mod config;
mod embed;
mod ui;
mod utils;

use anyhow::Context;
use clap::Parser;
use hookchat_core::webhook::WEBHOOK_URL_ENV;
use hookchat_session::{
    DEFAULT_AGENCY_NAME, Session, SessionConfig, SubmitOutcome, WebhookTransport,
};
use hookchat_tui::Theme;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// hookchat - chat with a webhook-backed assistant
#[derive(Parser, Debug)]
#[command(name = "hookchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Webhook URL (overrides HOOKCHAT_WEBHOOK_URL and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Name used in the greeting
    #[arg(short, long)]
    agency: Option<String>,

    /// Number of earlier messages sent along as context
    #[arg(long)]
    context_window: Option<usize>,

    /// Send a single message, print the reply and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Print the loader script that embeds a chat page served at ORIGIN
    #[arg(long, value_name = "ORIGIN")]
    embed_snippet: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("hookchat=debug,hookchat_core=debug,hookchat_session=debug")
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    if args.init_config {
        let path = config::Config::init().context("Error creating config")?;
        println!("Config file created at: {}", path.display());
        println!("\nExample config:\n{}", config::example_config());
        return Ok(());
    }

    if let Some(origin) = args.embed_snippet {
        let embed = embed::EmbedConfig::new(&origin)?;
        println!("{}", embed.snippet());
        return Ok(());
    }

    let cfg = config::Config::load();

    let Some(endpoint) = cfg.resolve_endpoint(args.endpoint) else {
        anyhow::bail!(
            "No webhook endpoint configured.\n\n\
             Options:\n  \
             1. Pass it on the command line: hookchat --endpoint https://...\n  \
             2. Set {}\n  \
             3. Add `endpoint = \"https://...\"` to {}",
            WEBHOOK_URL_ENV,
            config::Config::config_path().display()
        );
    };

    let transport = WebhookTransport::with_endpoint(&endpoint)
        .with_context(|| format!("Invalid webhook endpoint '{}'", endpoint))?;

    let agency = args
        .agency
        .or(cfg.agency_name.clone())
        .unwrap_or_else(|| DEFAULT_AGENCY_NAME.to_string());

    let mut session_config = SessionConfig::for_agency(&agency);
    if let Some(window) = args.context_window.or(cfg.context_window) {
        session_config = session_config.with_context_window(window);
    }

    tracing::debug!(%endpoint, context_window = session_config.context_window, "starting session");
    let session = Session::new(session_config, Arc::new(transport));

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&session, &command).await;
    }

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true) && io::stdout().is_terminal();
    if use_tui {
        let theme = cfg
            .theme
            .as_deref()
            .and_then(Theme::by_name)
            .unwrap_or_default();
        return ui::run_tui(&session, &agency, theme).await;
    }

    run_interactive(&session).await
}

async fn run_command(session: &Session, command: &str) -> anyhow::Result<()> {
    match session.submit(command).await {
        SubmitOutcome::Replied(reply) => {
            println!("{}", reply.content.to_display_string());
            Ok(())
        }
        SubmitOutcome::Ignored(reason) => {
            anyhow::bail!("Nothing to send ({:?})", reason)
        }
    }
}

async fn run_interactive(session: &Session) -> anyhow::Result<()> {
    if let Some(greeting) = session.messages().first() {
        println!("{}", greeting.content.to_display_string());
        println!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(input) = read_line()? else {
            // EOF
            break;
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(input, session) {
            match result {
                commands::CommandResult::ConfirmClear => {
                    print!("Clear the conversation? [y/N] ");
                    io::stdout().flush()?;
                    let answer = read_line()?.unwrap_or_default();
                    if matches!(answer.trim(), "y" | "Y" | "yes") {
                        session.reset();
                        println!("Cleared conversation.\n");
                        if let Some(greeting) = session.messages().first() {
                            println!("{}\n", greeting.content.to_display_string());
                        }
                    }
                }
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::Exit => {
                    break;
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        if let SubmitOutcome::Replied(reply) = session.submit(input).await {
            println!("{}", reply.content.to_display_string());
            println!();
        }
    }

    Ok(())
}

/// Read one line from stdin; `None` at end of input
fn read_line() -> io::Result<Option<String>> {
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}
