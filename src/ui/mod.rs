//! Terminal presentation for chat sessions.
//!
//! - [`render`] and [`fragment`]: turn segments into the stored fragment and
//!   read it back.
//! - [`terminal`]: format messages as ANSI text.
//! - [`chat_loop`]: the interaction loop that dispatches input to
//!   [`crate::commands`] and round trips via [`crate::core::chat_service`].
//! - [`theme`]: light/dark preference.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns conversation logic and server coordination.

pub mod chat_loop;
pub mod fragment;
pub mod render;
pub mod terminal;
pub mod theme;
