//! Formats transcript messages as terminal text.

use crate::core::message::{Message, Role};
use crate::core::segment::Segment;
use crate::ui::fragment;
use crate::ui::theme::Theme;
use crate::utils::syntax::highlight_code;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const CODE_INDENT: &str = "    ";
// Code blocks are always tagged as python when rendered.
const CODE_LANGUAGE: &str = "python";

pub const CLEAR_LINE: &str = "\r\x1b[2K";
pub const TYPING_TEXT: &str = "Assistant is typing...";

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub theme: Theme,
    pub syntax: bool,
    /// Emit ANSI escapes at all.
    pub color: bool,
}

struct Palette {
    user: &'static str,
    assistant: &'static str,
    dim: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            user: "\x1b[96m",
            assistant: "\x1b[92m",
            dim: "\x1b[90m",
        },
        Theme::Light => Palette {
            user: "\x1b[34m",
            assistant: "\x1b[32m",
            dim: "\x1b[2m",
        },
    }
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// `number` is the 1-based label shown to the user.
pub fn format_message(number: usize, message: &Message, style: Style) -> String {
    let colors = palette(style.theme);
    let (label, color) = match message.role {
        Role::User => ("You", colors.user),
        Role::Assistant => ("Assistant", colors.assistant),
    };

    let mut out = style.paint(BOLD, &format!("[{number}] "));
    out.push_str(&style.paint(color, label));
    out.push_str(&style.paint(colors.dim, &format!(" · {}", message.timestamp)));
    out.push('\n');
    out.push_str(&format_body(message, style));
    out
}

/// The message content alone, ending in a newline.
pub fn format_body(message: &Message, style: Style) -> String {
    let mut out = String::new();
    for segment in fragment::display_segments(&message.content) {
        match segment {
            Segment::Text(text) => out.push_str(&strip_controls(&text)),
            Segment::Code(code) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&format_code(&strip_controls(&code), style));
                out.push('\n');
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Server text must not drive the terminal; keep only newlines and tabs.
fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect()
}

pub fn format_transcript(messages: &[Message], style: Style) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| format_message(i + 1, message, style))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_code(code: &str, style: Style) -> String {
    let body = if style.color && style.syntax {
        highlight_code(code, CODE_LANGUAGE, style.theme).unwrap_or_else(|| code.to_string())
    } else {
        code.to_string()
    };
    body.trim_end_matches('\n')
        .lines()
        .map(|line| format!("{CODE_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_typing(style: Style) -> String {
    style.paint(palette(style.theme).dim, TYPING_TEXT)
}

pub fn format_status(status: &str, style: Style) -> String {
    style.paint(palette(style.theme).dim, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;

    fn plain() -> Style {
        Style {
            theme: Theme::Light,
            syntax: false,
            color: false,
        }
    }

    #[test]
    fn header_shows_number_role_and_time() {
        let message = Message::user("hi <there>", "09:41".into());
        assert_eq!(
            format_message(3, &message, plain()),
            "[3] You · 09:41\nhi <there>\n"
        );
    }

    #[test]
    fn code_blocks_are_indented_on_their_own_lines() {
        let message = Message::assistant("Use this:\n```python\nprint(1)\n```\ndone", "10:00".into());
        assert_eq!(
            format_message(1, &message, plain()),
            "[1] Assistant · 10:00\nUse this:\n    print(1)\n\ndone\n"
        );
    }

    #[test]
    fn control_sequences_in_replies_are_not_passed_through() {
        let message = Message::assistant(
            "hi\x1b[2J\x1b]0;pwned\x07 there\n```\nx\x1b[31m = 1\r\n```",
            "10:00".into(),
        );
        let body = format_body(&message, plain());
        assert!(!body.contains('\x1b'));
        assert!(!body.contains('\x07'));
        assert!(!body.contains('\r'));
        assert_eq!(body, "hi[2J]0;pwned there\n    x[31m = 1\n");
    }

    #[test]
    fn transcript_numbers_from_one() {
        let messages = vec![
            Message::assistant("hello", "08:00".into()),
            Message::user("question", "08:01".into()),
        ];
        let text = format_transcript(&messages, plain());
        assert!(text.starts_with("[1] Assistant"));
        assert!(text.contains("[2] You · 08:01"));
    }

    #[test]
    fn color_wraps_labels_in_escapes() {
        let style = Style {
            theme: Theme::Dark,
            syntax: false,
            color: true,
        };
        let out = format_message(1, &Message::user("x", "08:00".into()), style);
        assert!(out.contains("\x1b[96mYou\x1b[0m"));
        assert!(format_typing(style).ends_with(RESET));
    }

    #[test]
    fn syntax_highlighting_only_with_color() {
        let style = Style {
            theme: Theme::Dark,
            syntax: true,
            color: false,
        };
        let message = Message::assistant("```\nx = 1\n```", "08:00".into());
        assert!(!format_message(1, &message, style).contains('\x1b'));
    }
}
