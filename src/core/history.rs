//! Live transcript plus its bounded, persisted snapshot.
//!
//! The live transcript is everything currently on screen and is never
//! truncated. After every append or removal the newest
//! [`MAX_STORED_MESSAGES`] entries are written to the `chatHistory` slot as a
//! whole-record replacement. A failed write rolls the live transcript back,
//! so callers see each mutation either fully applied or not at all.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::message::{Message, RenderedContent, Role};
use crate::core::storage::{KeyValueStore, StorageError, HISTORY_KEY};

pub const MAX_STORED_MESSAGES: usize = 50;

/// One entry of the persisted record, in its wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub content: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
    pub timestamp: String,
}

impl From<&Message> for PersistedEntry {
    fn from(message: &Message) -> Self {
        Self {
            content: message.content.as_str().to_string(),
            is_user: message.role.is_user(),
            timestamp: message.timestamp.clone(),
        }
    }
}

impl From<PersistedEntry> for Message {
    fn from(entry: PersistedEntry) -> Self {
        Self {
            role: Role::from_is_user(entry.is_user),
            content: RenderedContent::from_rendered(entry.content),
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug)]
pub enum HistoryError {
    IndexOutOfRange { index: usize, len: usize },
    Storage(StorageError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::IndexOutOfRange { index, len } => {
                write!(f, "No message at index {index} (transcript has {len})")
            }
            HistoryError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for HistoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            HistoryError::IndexOutOfRange { .. } => None,
            HistoryError::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for HistoryError {
    fn from(value: StorageError) -> Self {
        HistoryError::Storage(value)
    }
}

pub struct HistoryStore<S> {
    store: S,
    transcript: Vec<Message>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.transcript.get(index)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Append to the live transcript and rewrite the persisted suffix.
    ///
    /// Returns the new live message count.
    pub fn append(&mut self, message: Message) -> Result<usize, StorageError> {
        self.transcript.push(message);
        if let Err(err) = self.save() {
            self.transcript.pop();
            return Err(err);
        }
        Ok(self.transcript.len())
    }

    pub fn remove(&mut self, index: usize) -> Result<Message, HistoryError> {
        if index >= self.transcript.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.transcript.len(),
            });
        }
        let removed = self.transcript.remove(index);
        if let Err(err) = self.save() {
            self.transcript.insert(index, removed);
            return Err(err.into());
        }
        Ok(removed)
    }

    /// Show a message without writing it, e.g. the welcome line after a reset.
    pub fn seed(&mut self, message: Message) -> usize {
        self.transcript.push(message);
        self.transcript.len()
    }

    /// Read the persisted record. Absent or malformed records read as empty.
    pub fn load(&self) -> Vec<Message> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "Could not read chat history; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<PersistedEntry>>(&raw) {
            Ok(entries) => entries.into_iter().map(Message::from).collect(),
            Err(err) => {
                warn!(error = %err, "Ignoring malformed chat history");
                Vec::new()
            }
        }
    }

    /// Replace the live transcript with the persisted record, without writing.
    pub fn restore(&mut self) -> usize {
        self.transcript = self.load();
        debug!(count = self.transcript.len(), "Restored chat history");
        self.transcript.len()
    }

    /// Delete the persisted record and empty the live transcript.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(HISTORY_KEY)?;
        self.transcript.clear();
        Ok(())
    }

    /// The entries that would be written for the current transcript.
    pub fn persisted_record(&self) -> Vec<PersistedEntry> {
        let skip = self.transcript.len().saturating_sub(MAX_STORED_MESSAGES);
        self.transcript[skip..]
            .iter()
            .map(PersistedEntry::from)
            .collect()
    }

    fn save(&mut self) -> Result<(), StorageError> {
        let record = self.persisted_record();
        let encoded = serde_json::to_string(&record)?;
        self.store.set(HISTORY_KEY, &encoded)
    }
}
