use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        usage: "/clear [yes]",
        help: "Reset the conversation on the server and clear local history.",
        handler: super::handle_clear,
    },
    Command {
        name: "delete",
        usage: "/delete <n>",
        help: "Delete message n from the history.",
        handler: super::handle_delete,
    },
    Command {
        name: "copy",
        usage: "/copy <n>",
        help: "Copy the text of message n to the clipboard.",
        handler: super::handle_copy,
    },
    Command {
        name: "code",
        usage: "/code <n> [k]",
        help: "Copy code block k (default 1) of message n to the clipboard.",
        handler: super::handle_code,
    },
    Command {
        name: "count",
        usage: "/count",
        help: "Show how many messages are in the history.",
        handler: super::handle_count,
    },
    Command {
        name: "theme",
        usage: "/theme [light|dark]",
        help: "Toggle the theme or set it directly.",
        handler: super::handle_theme,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "Print the whole conversation again.",
        handler: super::handle_history,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
