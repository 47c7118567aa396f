//! Conversation state between the input loop and the server.
//!
//! A session owns the [`HistoryStore`], the input lock held while a send is
//! outstanding, and a generation counter. Each send is tagged with the
//! generation current when it was issued; a successful reset bumps the
//! generation, so a reply that arrives after the reset is dropped instead of
//! landing in the fresh transcript.

use std::error::Error as StdError;
use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::chat_client::{ChatError, Responder};
use crate::core::history::{HistoryError, HistoryStore};
use crate::core::message::{
    Message, INVALID_REPLY_NOTICE, RESET_FAILED_NOTICE, RESET_NOTICE, SEND_FAILED_NOTICE,
};
use crate::core::storage::{KeyValueStore, StorageError};
use crate::ui::fragment;

/// A reply containing this asks the client to start the conversation over.
pub const RESTART_PHRASE: &str = "need to restart our conversation";

#[derive(Debug)]
pub enum SessionError {
    /// A previous message is still waiting for its reply.
    Busy,
    History(HistoryError),
    Storage(StorageError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => write!(f, "Still waiting for the previous reply"),
            SessionError::History(err) => write!(f, "{err}"),
            SessionError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::Busy => None,
            SessionError::History(err) => Some(err),
            SessionError::Storage(err) => Some(err),
        }
    }
}

impl From<HistoryError> for SessionError {
    fn from(value: HistoryError) -> Self {
        SessionError::History(value)
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        SessionError::Storage(value)
    }
}

/// A message accepted for sending.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub text: String,
    pub generation: u64,
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Shown { count: usize },
    /// Issued before a reset that has since completed.
    Stale,
    /// The caller must run a reset; the reply is shown once it finishes.
    RestartRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub cleared: bool,
    pub count: usize,
}

pub struct ChatSession<S> {
    history: HistoryStore<S>,
    welcome: String,
    generation: u64,
    awaiting_reply: bool,
    send_cancel: Option<CancellationToken>,
    deferred_reply: Option<String>,
}

impl<S: KeyValueStore> ChatSession<S> {
    pub fn new(history: HistoryStore<S>, welcome: impl Into<String>) -> Self {
        Self {
            history,
            welcome: welcome.into(),
            generation: 0,
            awaiting_reply: false,
            send_cancel: None,
            deferred_reply: None,
        }
    }

    /// Restore saved history, or show the welcome message when there is none.
    pub fn start(&mut self) -> usize {
        if self.history.restore() == 0 {
            self.seed_welcome();
        }
        self.history.len()
    }

    pub fn transcript(&self) -> &[Message] {
        self.history.transcript()
    }

    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    /// Record the user's message and lock input until the reply is handled.
    ///
    /// Blank input is ignored and yields `Ok(None)`.
    pub fn begin_send(&mut self, input: &str) -> Result<Option<OutboundMessage>, SessionError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.awaiting_reply {
            return Err(SessionError::Busy);
        }

        self.history.append(Message::user_now(text))?;
        self.awaiting_reply = true;
        let cancel_token = CancellationToken::new();
        self.send_cancel = Some(cancel_token.clone());
        debug!(generation = self.generation, "Message queued");

        Ok(Some(OutboundMessage {
            text: text.to_string(),
            generation: self.generation,
            cancel_token,
        }))
    }

    pub fn finish_send(
        &mut self,
        generation: u64,
        result: Result<String, ChatError>,
    ) -> Result<ReplyOutcome, SessionError> {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Dropping reply issued before reset"
            );
            return Ok(ReplyOutcome::Stale);
        }
        self.send_cancel = None;

        let text = match result {
            Ok(reply) if reply.contains(RESTART_PHRASE) => {
                info!("Server asked to restart the conversation");
                self.deferred_reply = Some(reply);
                return Ok(ReplyOutcome::RestartRequested);
            }
            Ok(reply) => reply,
            Err(ChatError::MissingResponse) => {
                warn!("Reply had no response text");
                INVALID_REPLY_NOTICE.to_string()
            }
            Err(err) => {
                warn!(error = %err, "Send failed");
                SEND_FAILED_NOTICE.to_string()
            }
        };

        self.awaiting_reply = false;
        let count = self.history.append(Message::assistant_now(&text))?;
        Ok(ReplyOutcome::Shown { count })
    }

    /// Apply the result of a server-side reset.
    ///
    /// On success local history is cleared, any in-flight send is cancelled
    /// and the generation advances. On failure local history is left as it
    /// was and an error notice is shown. A reply deferred by a restart
    /// request is shown afterwards either way.
    pub fn finish_reset(
        &mut self,
        result: Result<(), ChatError>,
    ) -> Result<ResetOutcome, SessionError> {
        let deferred = self.deferred_reply.take();
        if deferred.is_some() {
            self.awaiting_reply = false;
        }

        let cleared = match result {
            Ok(()) => {
                self.history.clear()?;
                self.generation += 1;
                if let Some(token) = self.send_cancel.take() {
                    token.cancel();
                }
                self.awaiting_reply = false;
                self.seed_welcome();
                self.history.append(Message::assistant_now(RESET_NOTICE))?;
                info!(generation = self.generation, "Chat history cleared");
                true
            }
            Err(err) => {
                warn!(error = %err, "Reset failed; keeping local history");
                self.history.append(Message::assistant_now(RESET_FAILED_NOTICE))?;
                false
            }
        };

        if let Some(reply) = deferred {
            self.history.append(Message::assistant_now(&reply))?;
        }

        Ok(ResetOutcome {
            cleared,
            count: self.history.len(),
        })
    }

    /// Send and wait for the reply, running a reset if the server asks.
    pub async fn converse(
        &mut self,
        responder: &dyn Responder,
        input: &str,
    ) -> Result<Option<ReplyOutcome>, SessionError> {
        let Some(outbound) = self.begin_send(input)? else {
            return Ok(None);
        };
        let result = responder.send_message(&outbound.text).await;
        let outcome = self.finish_send(outbound.generation, result)?;
        if outcome == ReplyOutcome::RestartRequested {
            let reset = self.finish_reset(responder.reset_chat().await)?;
            return Ok(Some(ReplyOutcome::Shown { count: reset.count }));
        }
        Ok(Some(outcome))
    }

    pub async fn reset(&mut self, responder: &dyn Responder) -> Result<ResetOutcome, SessionError> {
        let result = responder.reset_chat().await;
        self.finish_reset(result)
    }

    /// Delete one message; returns the remaining count.
    pub fn delete(&mut self, index: usize) -> Result<usize, SessionError> {
        self.history.remove(index)?;
        Ok(self.history.len())
    }

    pub fn message_text(&self, index: usize) -> Option<String> {
        self.history
            .get(index)
            .map(|message| fragment::plain_text(&message.content))
    }

    pub fn code_block(&self, index: usize, block: usize) -> Option<String> {
        let message = self.history.get(index)?;
        fragment::code_blocks(&message.content).into_iter().nth(block)
    }

    fn seed_welcome(&mut self) {
        let welcome = Message::assistant_now(&self.welcome);
        self.history.seed(welcome);
    }
}
