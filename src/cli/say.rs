//! One-shot "say" command

use std::error::Error;
use std::io::{self, Write};

use crate::core::app::App;
use crate::core::chat_client::ChatClient;
use crate::core::config::Config;
use crate::ui::terminal;

pub async fn run_say(prompt: Vec<String>, config: &Config) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: chooto say <prompt>");
        std::process::exit(1);
    }

    let data_dir = config.resolve_data_dir()?;
    let mut app = App::open(&data_dir, config.welcome_message(), config.syntax_enabled());
    let client = ChatClient::new(config.server_url());

    app.session.converse(&client, &prompt).await?;

    let Some(reply) = app.session.transcript().last() else {
        return Ok(());
    };
    let style = super::stdout_style(app.theme, config);
    let mut stdout = io::stdout();
    write!(stdout, "{}", terminal::format_body(reply, style))?;
    stdout.flush()?;
    Ok(())
}
