//! # rentmap-cli
//!
//! The `rentmap` binary: configuration, startup loading, one-shot queries,
//! and the API server.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction, QueryCommand};
pub use commands::{LoadedIndex, load_index, run_query, serve};
pub use config::RentmapConfig;
