//! Slash commands typed at the chat prompt.
//!
//! Message numbers are 1-based, matching the `[n]` labels printed next to
//! each message.

mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::app::App;
use crate::utils::clipboard::copy_to_clipboard;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Run a server-side reset.
    Reset,
    /// Reprint the transcript.
    Redraw,
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        (command.handler)(app, CommandInvocation { args })
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<20} {}", command.usage, command.help));
    }
    app.set_status(help);
    CommandResult::Continue
}

pub const CLEAR_QUESTION: &str = "Are you sure you want to clear the chat history?";

pub(super) fn handle_clear(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.eq_ignore_ascii_case("yes") {
        return CommandResult::Reset;
    }
    app.set_status(format!("{CLEAR_QUESTION} Type /clear yes to confirm."));
    CommandResult::Continue
}

pub(super) fn handle_delete(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(index) = parse_message_number(app, invocation.args, "/delete <n>") else {
        return CommandResult::Continue;
    };
    match app.session.delete(index) {
        Ok(count) => {
            app.set_status(format!("Message {} deleted, {}", index + 1, count_label(count)));
            CommandResult::Redraw
        }
        Err(err) => {
            app.set_status(format!("Delete failed: {err}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_copy(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(index) = parse_message_number(app, invocation.args, "/copy <n>") else {
        return CommandResult::Continue;
    };
    match app.session.message_text(index) {
        Some(text) => copy_with_status(app, &text, "Message copied"),
        None => app.set_status(format!("No message {}", index + 1)),
    }
    CommandResult::Continue
}

pub(super) fn handle_code(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let mut parts = invocation.args.split_whitespace();
    let Some(index) = parse_message_number(app, parts.next().unwrap_or(""), "/code <n> [k]")
    else {
        return CommandResult::Continue;
    };
    let block = match parts.next().map(parse_one_based) {
        None => 0,
        Some(Some(block)) => block,
        Some(None) => {
            app.set_status("Usage: /code <n> [k]");
            return CommandResult::Continue;
        }
    };

    match app.session.code_block(index, block) {
        Some(code) => copy_with_status(app, &code, "Code copied"),
        None => app.set_status(format!(
            "Message {} has no code block {}",
            index + 1,
            block + 1
        )),
    }
    CommandResult::Continue
}

pub(super) fn handle_count(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let count = app.session.message_count();
    app.set_status(count_label(count));
    CommandResult::Continue
}

pub fn count_label(count: usize) -> String {
    let noun = if count == 1 { "message" } else { "messages" };
    format!("{count} {noun}")
}

pub(super) fn handle_theme(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let theme = if invocation.args.is_empty() {
        app.theme.toggled()
    } else {
        match invocation.args.parse() {
            Ok(theme) => theme,
            Err(err) => {
                app.set_status(err);
                return CommandResult::Continue;
            }
        }
    };

    match app.set_theme(theme) {
        Ok(()) => {
            app.set_status(format!("Theme set to {theme}"));
            CommandResult::Redraw
        }
        Err(err) => {
            app.set_status(format!("Could not save theme: {err}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_history(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Redraw
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

fn parse_one_based(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn parse_message_number(app: &mut App, arg: &str, usage: &str) -> Option<usize> {
    let index = parse_one_based(arg);
    if index.is_none() {
        app.set_status(format!("Usage: {usage}"));
    }
    index
}

fn copy_with_status(app: &mut App, text: &str, done: &str) {
    match copy_to_clipboard(text) {
        Ok(()) => app.set_status(done),
        Err(err) => app.set_status(format!("Clipboard error: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::WELCOME_MESSAGE;
    use crate::core::storage::{KeyValueStore, MemoryStore, THEME_KEY};
    use crate::ui::theme::Theme;

    fn create_test_app() -> App {
        App::with_store(Box::new(MemoryStore::new()), WELCOME_MESSAGE, false)
    }

    fn add_exchange(app: &mut App, question: &str, answer: &str) {
        let outbound = app.session.begin_send(question).unwrap().unwrap();
        app.session
            .finish_send(outbound.generation, Ok(answer.to_string()))
            .unwrap();
    }

    #[test]
    fn plain_text_is_a_message() {
        let mut app = create_test_app();
        assert_eq!(
            process_input(&mut app, "hello there"),
            CommandResult::ProcessAsMessage("hello there".to_string())
        );
    }

    #[test]
    fn unknown_command_is_sent_as_message() {
        let mut app = create_test_app();
        assert_eq!(
            process_input(&mut app, "/usr/bin/python"),
            CommandResult::ProcessAsMessage("/usr/bin/python".to_string())
        );
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let mut app = create_test_app();
        assert_eq!(process_input(&mut app, "/QUIT"), CommandResult::Quit);
        assert_eq!(process_input(&mut app, "/Clear YES"), CommandResult::Reset);
    }

    #[test]
    fn clear_asks_before_resetting() {
        let mut app = create_test_app();
        assert_eq!(process_input(&mut app, "/clear"), CommandResult::Continue);
        assert!(app.take_status().unwrap().starts_with(CLEAR_QUESTION));
        assert_eq!(process_input(&mut app, "/clear maybe"), CommandResult::Continue);
        assert_eq!(process_input(&mut app, "/clear yes"), CommandResult::Reset);
    }

    #[test]
    fn help_lists_every_command() {
        let mut app = create_test_app();
        process_input(&mut app, "/help");
        let status = app.take_status().unwrap();
        for command in all_commands() {
            assert!(status.contains(command.usage));
        }
    }

    #[test]
    fn delete_uses_one_based_numbers() {
        let mut app = create_test_app();
        add_exchange(&mut app, "q", "a");
        assert_eq!(process_input(&mut app, "/delete 2"), CommandResult::Redraw);
        assert_eq!(
            app.take_status().as_deref(),
            Some("Message 2 deleted, 2 messages")
        );
        assert_eq!(app.session.message_text(1).as_deref(), Some("a"));
    }

    #[test]
    fn delete_rejects_bad_numbers() {
        let mut app = create_test_app();
        assert_eq!(process_input(&mut app, "/delete 0"), CommandResult::Continue);
        assert_eq!(app.take_status().as_deref(), Some("Usage: /delete <n>"));

        assert_eq!(process_input(&mut app, "/delete 7"), CommandResult::Continue);
        assert!(app.take_status().unwrap().starts_with("Delete failed"));
        assert_eq!(app.session.message_count(), 1);
    }

    #[test]
    fn code_reports_missing_block() {
        let mut app = create_test_app();
        add_exchange(&mut app, "q", "no code here");
        process_input(&mut app, "/code 3 2");
        assert_eq!(
            app.take_status().as_deref(),
            Some("Message 3 has no code block 2")
        );
    }

    #[test]
    fn count_reports_messages() {
        let mut app = create_test_app();
        process_input(&mut app, "/count");
        assert_eq!(app.take_status().as_deref(), Some("1 message"));
        add_exchange(&mut app, "q", "a");
        process_input(&mut app, "/count");
        assert_eq!(app.take_status().as_deref(), Some("3 messages"));
    }

    #[test]
    fn theme_command_sets_and_saves() {
        let mut app = create_test_app();
        assert_eq!(process_input(&mut app, "/theme dark"), CommandResult::Redraw);
        assert_eq!(app.theme, Theme::Dark);
        assert_eq!(
            app.session
                .history()
                .store()
                .get(THEME_KEY)
                .unwrap()
                .as_deref(),
            Some("dark")
        );

        process_input(&mut app, "/theme");
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn theme_command_rejects_unknown_names() {
        let mut app = create_test_app();
        let before = app.theme;
        assert_eq!(process_input(&mut app, "/theme sepia"), CommandResult::Continue);
        assert_eq!(app.theme, before);
        assert!(app.take_status().unwrap().contains("sepia"));
    }
}
