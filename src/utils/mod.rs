pub mod clipboard;
pub mod syntax;
