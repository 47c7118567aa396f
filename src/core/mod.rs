pub mod app;
pub mod chat_client;
pub mod chat_service;
pub mod config;
pub mod history;
pub mod message;
pub mod segment;
pub mod session;
pub mod storage;
