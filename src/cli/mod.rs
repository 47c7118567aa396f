//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::say::run_say;
use crate::commands::CLEAR_QUESTION;
use crate::core::app::App;
use crate::core::chat_client::ChatClient;
use crate::core::config::Config;
use crate::core::history::HistoryStore;
use crate::core::storage::FileStore;
use crate::ui::chat_loop::run_chat;
use crate::ui::terminal::{self, Style};
use crate::ui::theme::{self, Theme};

const LOG_ENV: &str = "CHOOTO_LOG";
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser)]
#[command(name = "chooto", version = VERSION)]
#[command(about = "A terminal chat client for a simple chat server")]
#[command(
    long_about = "Chooto talks to a chat server exposing /send_message and /reset_chat. \
Assistant code blocks are shown highlighted, and the last 50 messages are kept \
between runs.\n\n\
Commands inside the chat:\n\
  /help             List commands\n\
  /clear yes        Start the conversation over\n\
  /delete <n>       Delete message n\n\
  /copy <n>         Copy message n to the clipboard\n\
  /code <n> [k]     Copy code block k of message n\n\
  /theme [name]     Toggle or set the light/dark theme\n\
  /quit             Leave (Ctrl+D works too)\n\n\
Set CHOOTO_LOG (e.g. CHOOTO_LOG=debug) for diagnostics on stderr."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat server base URL for this run
    #[arg(long, global = true, value_name = "URL")]
    pub server_url: Option<String>,

    /// Directory holding history and theme for this run
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// Print the saved conversation
    History,
    /// Reset the conversation on the server and clear local history
    Clear {
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the theme, or set it to light or dark
    Theme { theme: Option<String> },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn confirm(question: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// The saved config with this run's flag overrides applied.
fn effective_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Some(url) = &args.server_url {
        config.set_value("server-url", url)?;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn stdout_style(theme: Theme, config: &Config) -> Style {
    Style {
        theme,
        syntax: config.syntax_enabled(),
        color: io::stdout().is_terminal(),
    }
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = effective_config(&args)?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let data_dir = config.resolve_data_dir()?;
            let app = App::open(&data_dir, config.welcome_message(), config.syntax_enabled());
            let client = ChatClient::new(config.server_url());
            run_chat(app, Arc::new(client)).await
        }
        Commands::Say { prompt } => run_say(prompt, &config).await,
        Commands::History => {
            let store = FileStore::new(config.resolve_data_dir()?);
            let theme = theme::preferred_theme(&store, theme::detect_system_theme());
            let messages = HistoryStore::new(store).load();
            if messages.is_empty() {
                println!("No saved conversation.");
            } else {
                let style = stdout_style(theme, &config);
                println!("{}", terminal::format_transcript(&messages, style));
            }
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes && !confirm(CLEAR_QUESTION)? {
                println!("Nothing cleared.");
                return Ok(());
            }
            let data_dir = config.resolve_data_dir()?;
            let mut app = App::open(&data_dir, config.welcome_message(), config.syntax_enabled());
            let client = ChatClient::new(config.server_url());
            let outcome = app.session.reset(&client).await?;
            if outcome.cleared {
                println!("✅ Chat history cleared");
                Ok(())
            } else {
                Err("Could not reset the conversation on the server; local history kept".into())
            }
        }
        Commands::Theme { theme: requested } => {
            let mut store = FileStore::new(config.resolve_data_dir()?);
            match requested {
                Some(name) => {
                    let theme: Theme = name.parse()?;
                    theme::save_theme(&mut store, theme)?;
                    println!("✅ Set theme to: {theme}");
                }
                None => {
                    let theme = theme::preferred_theme(&store, theme::detect_system_theme());
                    println!("{theme}");
                }
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            config.set_value(&key, &value)?;
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            config.unset_value(&key)?;
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}
