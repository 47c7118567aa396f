//! Line-oriented chat loop.
//!
//! Input lines and server results are handled on one task; round trips run
//! on [`ChatService`] and come back over its channel, so the prompt stays
//! usable (for `/clear` and friends) while a reply is outstanding.

use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{count_label, process_input, CommandResult};
use crate::core::app::App;
use crate::core::chat_client::Responder;
use crate::core::chat_service::{ChatService, ServiceEvent};
use crate::core::session::ReplyOutcome;
use crate::ui::terminal::{self, Style, CLEAR_LINE};

const PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Screen<W: Write> {
    out: W,
    color: bool,
    printed: usize,
    typing: bool,
}

impl<W: Write> Screen<W> {
    fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            printed: 0,
            typing: false,
        }
    }

    fn style(&self, app: &App) -> Style {
        Style {
            theme: app.theme,
            syntax: app.syntax,
            color: self.color,
        }
    }

    fn redraw(&mut self, app: &App) -> io::Result<()> {
        let transcript = app.session.transcript();
        let text = terminal::format_transcript(transcript, self.style(app));
        writeln!(self.out, "{text}")?;
        self.printed = transcript.len();
        Ok(())
    }

    /// Print messages added since the last draw.
    fn show_new(&mut self, app: &App) -> io::Result<()> {
        let transcript = app.session.transcript();
        if transcript.len() < self.printed {
            return self.redraw(app);
        }
        let style = self.style(app);
        for (i, message) in transcript.iter().enumerate().skip(self.printed) {
            writeln!(self.out, "{}", terminal::format_message(i + 1, message, style))?;
        }
        self.printed = transcript.len();
        Ok(())
    }

    fn show_typing(&mut self, app: &App) -> io::Result<()> {
        write!(self.out, "{}", terminal::format_typing(self.style(app)))?;
        self.typing = true;
        self.out.flush()
    }

    fn clear_typing(&mut self) -> io::Result<()> {
        if self.typing {
            write!(self.out, "{CLEAR_LINE}")?;
            self.typing = false;
        }
        Ok(())
    }

    fn flush_status(&mut self, app: &mut App) -> io::Result<()> {
        if let Some(status) = app.take_status() {
            writeln!(self.out, "{}", terminal::format_status(&status, self.style(app)))?;
        }
        Ok(())
    }

    fn prompt(&mut self, app: &App) -> io::Result<()> {
        if !app.session.is_awaiting_reply() {
            write!(self.out, "{PROMPT}")?;
        }
        self.out.flush()
    }
}

pub async fn run_chat(mut app: App, responder: Arc<dyn Responder>) -> Result<(), Box<dyn Error>> {
    let (service, mut events) = ChatService::new(responder);
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut screen = Screen::new(stdout, color);

    screen.redraw(&app)?;
    screen.prompt(&app)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if handle_line(&mut app, &service, &mut screen, &line)? == Flow::Quit {
                    break;
                }
            }
            Some((event, generation)) = events.recv() => {
                handle_event(&mut app, &service, &mut screen, event, generation)?;
            }
        }
    }

    debug!(messages = app.session.message_count(), "Chat loop finished");
    Ok(())
}

fn handle_line<W: Write>(
    app: &mut App,
    service: &ChatService,
    screen: &mut Screen<W>,
    line: &str,
) -> io::Result<Flow> {
    match process_input(app, line) {
        CommandResult::Continue => {}
        CommandResult::ProcessAsMessage(text) => match app.session.begin_send(&text) {
            Ok(Some(outbound)) => {
                screen.show_new(app)?;
                service.spawn_send(outbound.text, outbound.generation, outbound.cancel_token);
                screen.flush_status(app)?;
                screen.show_typing(app)?;
                return Ok(Flow::Continue);
            }
            Ok(None) => {}
            Err(err) => app.set_status(err.to_string()),
        },
        CommandResult::Reset => {
            service.spawn_reset(app.session.generation());
            app.set_status("Clearing chat history...");
        }
        CommandResult::Redraw => screen.redraw(app)?,
        CommandResult::Quit => return Ok(Flow::Quit),
    }

    screen.flush_status(app)?;
    screen.prompt(app)?;
    Ok(Flow::Continue)
}

fn handle_event<W: Write>(
    app: &mut App,
    service: &ChatService,
    screen: &mut Screen<W>,
    event: ServiceEvent,
    generation: u64,
) -> io::Result<()> {
    match event {
        ServiceEvent::Reply(result) => match app.session.finish_send(generation, result) {
            Ok(ReplyOutcome::Shown { .. }) => {
                screen.clear_typing()?;
                screen.show_new(app)?;
            }
            Ok(ReplyOutcome::Stale) => return Ok(()),
            Ok(ReplyOutcome::RestartRequested) => {
                service.spawn_reset(app.session.generation());
                return Ok(());
            }
            Err(err) => {
                screen.clear_typing()?;
                app.set_status(format!("Could not save reply: {err}"));
            }
        },
        ServiceEvent::ResetDone(result) => {
            debug!(generation, "Reset finished");
            screen.clear_typing()?;
            match app.session.finish_reset(result) {
                Ok(outcome) if outcome.cleared => {
                    screen.redraw(app)?;
                    app.set_status(count_label(outcome.count));
                }
                Ok(_) => screen.show_new(app)?,
                Err(err) => app.set_status(format!("Reset failed: {err}")),
            }
        }
    }

    screen.flush_status(app)?;
    screen.prompt(app)
}
