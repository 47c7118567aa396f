//! Runs server round trips off the input loop.
//!
//! Every result comes back on one channel tagged with the session generation
//! that issued it, so the session can drop replies that a reset overtook.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::chat_client::{ChatError, Responder};

#[derive(Debug)]
pub enum ServiceEvent {
    Reply(Result<String, ChatError>),
    ResetDone(Result<(), ChatError>),
}

pub type TaggedEvent = (ServiceEvent, u64);

#[derive(Clone)]
pub struct ChatService {
    responder: Arc<dyn Responder>,
    tx: mpsc::UnboundedSender<TaggedEvent>,
}

impl ChatService {
    pub fn new(responder: Arc<dyn Responder>) -> (Self, mpsc::UnboundedReceiver<TaggedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { responder, tx }, rx)
    }

    /// Send `message` in the background. Cancelling `cancel_token` drops the
    /// request without reporting anything.
    pub fn spawn_send(&self, message: String, generation: u64, cancel_token: CancellationToken) {
        let responder = Arc::clone(&self.responder);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = responder.send_message(&message) => {
                    let _ = tx.send((ServiceEvent::Reply(result), generation));
                }
                _ = cancel_token.cancelled() => {
                    debug!(generation, "Send cancelled");
                }
            }
        });
    }

    pub fn spawn_reset(&self, generation: u64) {
        let responder = Arc::clone(&self.responder);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = responder.reset_chat().await;
            let _ = tx.send((ServiceEvent::ResetDone(result), generation));
        });
    }
}
