//! Request and response bodies exchanged with the chat server.

use serde::{Deserialize, Serialize};

pub const SEND_MESSAGE_PATH: &str = "send_message";
pub const RESET_CHAT_PATH: &str = "reset_chat";

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
}

/// `response` is optional so a well-formed body without it can be told
/// apart from a transport failure.
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetChatRequest {
    pub reset: bool,
}

impl Default for ResetChatRequest {
    fn default() -> Self {
        Self { reset: true }
    }
}
