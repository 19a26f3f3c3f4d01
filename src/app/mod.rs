//! CLI screens: one handler per sidebar entry.

pub mod commands;
pub mod views;

pub use commands::{App, CommandHandler};
