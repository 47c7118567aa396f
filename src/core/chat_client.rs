//! HTTP client for the chat server's two endpoints.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::api::{
    ResetChatRequest, SendMessageRequest, SendMessageResponse, RESET_CHAT_PATH, SEND_MESSAGE_PATH,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug)]
pub enum ChatError {
    Transport(reqwest::Error),
    Status(StatusCode),
    /// The body parsed but carried no `response` text.
    MissingResponse,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(err) => write!(f, "Request failed: {err}"),
            ChatError::Status(status) => write!(f, "Server returned {status}"),
            ChatError::MissingResponse => write!(f, "Server reply had no response text"),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(value: reqwest::Error) -> Self {
        ChatError::Transport(value)
    }
}

/// The remote side of a conversation.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<String, ChatError>;

    async fn reset_chat(&self) -> Result<(), ChatError>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Responder for ChatClient {
    async fn send_message(&self, message: &str) -> Result<String, ChatError> {
        let url = self.endpoint(SEND_MESSAGE_PATH);
        debug!(%url, chars = message.len(), "Sending message");

        let response = self
            .client
            .post(url)
            .json(&SendMessageRequest { message })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }
        let body: SendMessageResponse = response.json().await?;

        match body.response {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ChatError::MissingResponse),
        }
    }

    async fn reset_chat(&self) -> Result<(), ChatError> {
        let url = self.endpoint(RESET_CHAT_PATH);
        debug!(%url, "Resetting remote chat");

        let response = self
            .client
            .post(url)
            .json(&ResetChatRequest::default())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ChatClient::new("http://localhost:8000///");
        assert_eq!(client.endpoint("send_message"), "http://localhost:8000/send_message");
        assert_eq!(client.endpoint("/reset_chat"), "http://localhost:8000/reset_chat");
    }

    #[tokio::test]
    async fn send_message_posts_body_and_returns_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_json(serde_json::json!({ "message": "hello" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "hi there" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        assert_eq!(client.send_message("hello").await.unwrap(), "hi there");
    }

    #[tokio::test]
    async fn send_message_without_response_field_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "detail": "x" })),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        assert!(matches!(
            client.send_message("hello").await,
            Err(ChatError::MissingResponse)
        ));
    }

    #[tokio::test]
    async fn send_message_error_status_is_failure_even_with_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "response": "internal trace" })),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        assert!(matches!(
            client.send_message("hello").await,
            Err(ChatError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[tokio::test]
    async fn send_message_with_non_json_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        assert!(matches!(
            client.send_message("hello").await,
            Err(ChatError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn reset_posts_reset_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reset_chat"))
            .and(body_json(serde_json::json!({ "reset": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        client.reset_chat().await.unwrap();
    }

    #[tokio::test]
    async fn reset_non_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reset_chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        assert!(matches!(
            client.reset_chat().await,
            Err(ChatError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }
}
