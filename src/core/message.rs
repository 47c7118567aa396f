use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ui::render;

pub const WELCOME_MESSAGE: &str = "Hello! How can I help you today?";
pub const RESET_NOTICE: &str = "Chat history has been cleared. How can I help you?";
pub const RESET_FAILED_NOTICE: &str =
    "There was an error clearing the chat history. Please try again.";
pub const SEND_FAILED_NOTICE: &str = "Sorry, there was an error processing your message.";
pub const INVALID_REPLY_NOTICE: &str = "Sorry, there was an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn from_is_user(is_user: bool) -> Self {
        if is_user {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// A rendered, escaped message fragment.
///
/// Produced once by [`crate::ui::render`] and stored verbatim; it is never
/// run back through the segment parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedContent(String);

impl RenderedContent {
    /// Wrap an already-rendered fragment, e.g. one read back from storage.
    pub fn from_rendered(fragment: String) -> Self {
        Self(fragment)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: RenderedContent,
    pub timestamp: String,
}

impl Message {
    /// User input is escaped as a whole; it is never scanned for code blocks.
    pub fn user(text: &str, timestamp: String) -> Self {
        Self {
            role: Role::User,
            content: render::render_user(text),
            timestamp,
        }
    }

    pub fn assistant(text: &str, timestamp: String) -> Self {
        Self {
            role: Role::Assistant,
            content: render::render_assistant(text),
            timestamp,
        }
    }

    pub fn user_now(text: &str) -> Self {
        Self::user(text, current_timestamp())
    }

    pub fn assistant_now(text: &str) -> Self {
        Self::assistant(text, current_timestamp())
    }
}

/// Local wall-clock time as `HH:MM`.
pub fn display_timestamp(at: DateTime<Local>) -> String {
    at.format("%H:%M").to_string()
}

pub fn current_timestamp() -> String {
    display_timestamp(Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::try_from("user"), Ok(Role::User));
        assert_eq!(Role::try_from("assistant"), Ok(Role::Assistant));
        assert!(Role::try_from("system").is_err());
        assert_eq!(String::from(Role::Assistant), "assistant");
    }

    #[test]
    fn timestamp_is_hour_and_minute() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 42).unwrap();
        assert_eq!(display_timestamp(at), "07:05");
    }

    #[test]
    fn user_messages_are_escaped_but_not_parsed() {
        let message = Message::user("<b>hi</b>\n```\ncode\n```", "10:00".into());
        assert_eq!(
            message.content.as_str(),
            "&lt;b&gt;hi&lt;/b&gt;\n```\ncode\n```"
        );
    }

    #[test]
    fn assistant_messages_render_code_blocks() {
        let message = Message::assistant("see\n```\nls\n```", "10:00".into());
        assert!(message.content.as_str().contains("class=\"code-block\""));
        assert!(message.content.as_str().starts_with("see\n"));
    }
}
