//! Light/dark preference: a saved `theme` slot, else the OS hint, else light.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::core::storage::{KeyValueStore, StorageError, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme '{other}' (expected 'light' or 'dark')")),
        }
    }
}

/// The saved theme, if the slot holds a recognised value.
pub fn saved_theme<S: KeyValueStore>(store: &S) -> Option<Theme> {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => value.parse().ok(),
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "Could not read saved theme");
            None
        }
    }
}

pub fn preferred_theme<S: KeyValueStore>(store: &S, system_hint: Option<Theme>) -> Theme {
    saved_theme(store).or(system_hint).unwrap_or_default()
}

pub fn save_theme<S: KeyValueStore>(store: &mut S, theme: Theme) -> Result<(), StorageError> {
    store.set(THEME_KEY, theme.as_str())
}

/// Best-effort OS appearance lookup. Returns `None` when there is no hint.
pub fn detect_system_theme() -> Option<Theme> {
    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        // The key only exists while dark mode is on.
        let output = Command::new("/usr/bin/defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .ok()?;
        let style = String::from_utf8_lossy(&output.stdout).to_ascii_lowercase();
        return Some(if output.status.success() && style.contains("dark") {
            Theme::Dark
        } else {
            Theme::Light
        });
    }

    #[cfg(target_os = "windows")]
    {
        use winreg::enums::HKEY_CURRENT_USER;
        use winreg::RegKey;
        let personalize = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
            .ok()?;
        let apps_use_light: u32 = personalize.get_value("AppsUseLightTheme").ok()?;
        return Some(if apps_use_light == 0 {
            Theme::Dark
        } else {
            Theme::Light
        });
    }

    #[cfg(target_os = "linux")]
    {
        gsettings_hint("color-scheme", |value| {
            if value.contains("prefer-dark") {
                Some(Theme::Dark)
            } else if value.contains("default") || value.contains("prefer-light") {
                Some(Theme::Light)
            } else {
                None
            }
        })
        .or_else(|| {
            gsettings_hint("gtk-theme", |value| {
                Some(if value.contains("-dark") {
                    Theme::Dark
                } else {
                    Theme::Light
                })
            })
        })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(target_os = "linux")]
fn gsettings_hint(key: &str, classify: impl Fn(&str) -> Option<Theme>) -> Option<Theme> {
    let output = std::process::Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", key])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    classify(&String::from_utf8_lossy(&output.stdout).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(" light ".parse::<Theme>(), Ok(Theme::Light));
        assert!("dracula".parse::<Theme>().is_err());
    }

    #[test]
    fn saved_setting_beats_system_hint() {
        let mut store = MemoryStore::new();
        save_theme(&mut store, Theme::Light).unwrap();
        assert_eq!(preferred_theme(&store, Some(Theme::Dark)), Theme::Light);
    }

    #[test]
    fn system_hint_used_when_nothing_saved() {
        let store = MemoryStore::new();
        assert_eq!(preferred_theme(&store, Some(Theme::Dark)), Theme::Dark);
        assert_eq!(preferred_theme(&store, None), Theme::Light);
    }

    #[test]
    fn unrecognised_saved_value_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(preferred_theme(&store, Some(Theme::Dark)), Theme::Dark);
    }

    #[test]
    fn toggle_flips_and_persists_literal() {
        let mut store = MemoryStore::new();
        let next = Theme::Light.toggled();
        save_theme(&mut store, next).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }
}
