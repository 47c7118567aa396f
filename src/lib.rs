//! Chooto is a terminal client for a small chat server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation: segment parsing, message records, the
//!   bounded history kept in key-value slots, the HTTP client, and the session
//!   that ties replies and resets together.
//! - [`ui`] renders stored fragments, formats them for the terminal, and runs
//!   the line-oriented chat loop.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the request and response bodies sent to the server.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
