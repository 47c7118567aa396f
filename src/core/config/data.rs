use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::message::WELCOME_MESSAGE;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the chat server
    pub server_url: Option<String>,
    /// Directory holding the history and theme slots
    pub data_dir: Option<PathBuf>,
    /// Syntax highlighting for code blocks in the terminal
    pub syntax: Option<bool>,
    /// First message shown in an empty conversation
    pub welcome_message: Option<String>,
}

pub const CONFIG_KEYS: &[&str] = &["server-url", "data-dir", "syntax", "welcome-message"];

impl Config {
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn welcome_message(&self) -> &str {
        self.welcome_message.as_deref().unwrap_or(WELCOME_MESSAGE)
    }

    /// Apply a `set <key> <value>` command.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "server-url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(format!("server-url must start with http:// or https://: {value}"));
                }
                self.server_url = Some(value.trim_end_matches('/').to_string());
            }
            "data-dir" => self.data_dir = Some(PathBuf::from(value)),
            "syntax" => self.syntax = Some(parse_switch(value)?),
            "welcome-message" => self.welcome_message = Some(value.to_string()),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "server-url" => self.server_url = None,
            "data-dir" => self.data_dir = None,
            "syntax" => self.syntax = None,
            "welcome-message" => self.welcome_message = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Expected on/off, got '{other}'")),
    }
}

fn unknown_key(key: &str) -> String {
    format!("Unknown config key: {key} (known: {})", CONFIG_KEYS.join(", "))
}

/// Display a path with the home directory collapsed to `~`.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            if let Ok(relative) = path.strip_prefix(PathBuf::from(home)) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
