#![forbid(unsafe_code)]

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod models;
pub mod reader;
pub mod utils;
pub mod validate;

pub use cli::app::{Cli, Command};
pub use extract::{extract_action, extract_messages, extract_stream};
pub use models::NormalizedChatMessage;
