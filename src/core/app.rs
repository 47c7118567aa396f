//! State shared by the interactive loop and slash commands.

use std::path::Path;

use crate::core::history::HistoryStore;
use crate::core::session::ChatSession;
use crate::core::storage::{FileStore, KeyValueStore, StorageError};
use crate::ui::theme::{self, Theme};

pub type SlotStore = Box<dyn KeyValueStore + Send>;

pub struct App {
    pub session: ChatSession<SlotStore>,
    pub theme: Theme,
    pub syntax: bool,
    status: Option<String>,
}

impl App {
    /// Open the slots under `data_dir` and restore the conversation.
    pub fn open(data_dir: &Path, welcome: &str, syntax: bool) -> Self {
        Self::with_store(Box::new(FileStore::new(data_dir)), welcome, syntax)
    }

    pub fn with_store(store: SlotStore, welcome: &str, syntax: bool) -> Self {
        let theme = theme::preferred_theme(&store, theme::detect_system_theme());
        let mut session = ChatSession::new(HistoryStore::new(store), welcome);
        session.start();
        Self {
            session,
            theme,
            syntax,
            status: None,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StorageError> {
        theme::save_theme(self.session.history_mut().store_mut(), theme)?;
        self.theme = theme;
        Ok(())
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }
}
