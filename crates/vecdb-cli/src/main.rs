//! vecdb
//!
//! Command-line client for embedded and managed-cloud vector databases.
//!
//! # Usage
//!
//! ```bash
//! vecdb --uri ~/.lancedb tables
//! vecdb --uri db://mydb --api-key $KEY create vectors
//! vecdb --uri s3://bucket/db --read-consistency-secs 0 info
//! vecdb config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vecdb/config.toml)
//! 3. Environment variables (VECDB_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use vecdb_cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
