pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use adapters::{AnthropicClient, FileTextExtractor, LocalStorage};
pub use config::{AppConfig, Cli, Command, OutputFormat};
pub use crate::core::{ClauseValidator, ReviewEngine};
pub use utils::error::{Result, ValidatorError};
