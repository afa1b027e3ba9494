//! CLI subcommand implementations.

pub mod edit;
pub mod export;
pub mod init;
pub mod show;
pub mod track;
pub mod util;
