//! Timekeep CLI library.
//!
//! This crate provides the `tk` command-line interface over timekeep documents.

mod cli;
pub mod commands;
mod config;
pub mod document;

pub use cli::{Cli, Commands, ExportFormat};
pub use config::Config;
