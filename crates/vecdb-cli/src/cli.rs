//! CLI argument parsing for the vecdb client.
//!
//! CLI flags override settings from the config file and environment.

use clap::{Args, Parser, Subcommand};

/// vecdb
///
/// Connect to an embedded or managed-cloud vector database and manage its
/// tables.
#[derive(Parser, Debug)]
#[command(name = "vecdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/vecdb/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection parameters shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// Database location: path, object-store URI or db://name (default from config)
    #[arg(short, long, global = true)]
    pub uri: Option<String>,

    /// API key for db:// locations (falls back to LANCEDB_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Managed-cloud region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Managed-cloud endpoint replacing the regional one
    #[arg(long, global = true)]
    pub host_override: Option<String>,

    /// Embedded read-consistency interval in seconds (0 = check every read)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub read_consistency_secs: Option<f64>,

    /// Worker threads for managed-cloud requests
    #[arg(long, global = true)]
    pub request_threads: Option<usize>,

    /// Extra connection option (repeatable)
    #[arg(short = 'o', long = "option", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Object-store option for embedded locations (repeatable)
    #[arg(long = "storage-option", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub storage_options: Vec<(String, String)>,
}

/// Client commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List table names
    Tables,

    /// Create an empty table
    Create {
        /// Table name
        name: String,
    },

    /// Open a table and print its descriptor
    Open {
        /// Table name
        name: String,
    },

    /// Drop a table
    Drop {
        /// Table name
        name: String,
    },

    /// Show how the location resolves
    Info,

    /// Print the effective settings as TOML
    Config,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_tables() {
        let cli = Cli::parse_from(["vecdb", "--uri", "/data/db", "tables"]);
        assert!(matches!(cli.command, Commands::Tables));
        assert_eq!(cli.connect.uri, Some("/data/db".to_string()));
    }

    #[test]
    fn test_cli_args_after_subcommand() {
        let cli = Cli::parse_from(["vecdb", "create", "vectors", "-u", "db://mydb", "--api-key", "k"]);
        match cli.command {
            Commands::Create { name } => assert_eq!(name, "vectors"),
            _ => panic!("Expected Create command"),
        }
        assert_eq!(cli.connect.uri, Some("db://mydb".to_string()));
        assert_eq!(cli.connect.api_key, Some("k".to_string()));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["vecdb", "--config", "/path/to/config.toml", "info"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert!(matches!(cli.command, Commands::Info));
    }

    #[test]
    fn test_cli_with_log_level() {
        let cli = Cli::parse_from(["vecdb", "--log-level", "debug", "config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_key_value_options() {
        let cli = Cli::parse_from([
            "vecdb",
            "-o",
            "read_timeout=30",
            "--option",
            "connection_timeout=5",
            "--storage-option",
            "aws_region=us-west-2",
            "tables",
        ]);
        assert_eq!(
            cli.connect.options,
            vec![
                ("read_timeout".to_string(), "30".to_string()),
                ("connection_timeout".to_string(), "5".to_string()),
            ]
        );
        assert_eq!(
            cli.connect.storage_options,
            vec![("aws_region".to_string(), "us-west-2".to_string())]
        );
    }

    #[test]
    fn test_cli_rejects_malformed_option() {
        let result = Cli::try_parse_from(["vecdb", "-o", "no-equals", "tables"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_negative_interval_reaches_connect() {
        let cli = Cli::parse_from(["vecdb", "--read-consistency-secs", "-1", "tables"]);
        assert_eq!(cli.connect.read_consistency_secs, Some(-1.0));
    }

    #[test]
    fn test_cli_remote_flags() {
        let cli = Cli::parse_from([
            "vecdb",
            "--region",
            "eu-west-1",
            "--host-override",
            "http://localhost:10024",
            "--request-threads",
            "4",
            "drop",
            "old",
        ]);
        assert_eq!(cli.connect.region.as_deref(), Some("eu-west-1"));
        assert_eq!(
            cli.connect.host_override.as_deref(),
            Some("http://localhost:10024")
        );
        assert_eq!(cli.connect.request_threads, Some(4));
        assert!(matches!(cli.command, Commands::Drop { .. }));
    }
}
