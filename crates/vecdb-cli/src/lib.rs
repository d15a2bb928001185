//! vecdb client library exports.
//!
//! This crate provides the `vecdb` command-line client.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (tables, create, open, drop, info, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ConnectArgs};
pub use commands::{build_options, execute, init_logging, load_settings, run};
