//! Command implementations for the vecdb client.
//!
//! Handles:
//! - settings: load config, apply CLI overrides
//! - logging: tracing subscriber setup
//! - execute: connect and run one table command

use anyhow::{Context, Result};
use tracing::{debug, info};

use vecdb_connect::{ConnectOptions, Connection, DbConnection, Router};
use vecdb_types::Settings;

use crate::cli::{Cli, Commands, ConnectArgs};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    args: &ConnectArgs,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(uri) = &args.uri {
        settings.default_location = Some(uri.clone());
    }
    if let Some(region) = &args.region {
        settings.region = region.clone();
    }
    if let Some(host) = &args.host_override {
        settings.host_override = Some(host.clone());
    }
    if let Some(secs) = args.read_consistency_secs {
        settings.read_consistency_interval_secs = Some(secs);
    }
    if let Some(threads) = args.request_threads {
        settings.request_threads = Some(threads);
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    settings
        .validate()
        .context("Invalid command-line configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Connect options from settings plus the CLI-only parameters.
///
/// A non-finite read-consistency interval fails here. Other values are
/// validated when connecting.
pub fn build_options(settings: &Settings, args: &ConnectArgs) -> Result<ConnectOptions> {
    let mut options =
        ConnectOptions::from_settings(settings).context("Invalid connection settings")?;
    if let Some(key) = &args.api_key {
        options = options.api_key(key.clone());
    }
    for (key, value) in &args.storage_options {
        options = options.storage_option(key.clone(), value.clone());
    }
    for (key, value) in &args.options {
        options = options.extra_option(key.clone(), value.clone());
    }
    Ok(options)
}

/// Run `command` and return the lines to print.
pub async fn execute(
    router: &Router,
    settings: &Settings,
    args: &ConnectArgs,
    command: &Commands,
) -> Result<Vec<String>> {
    if let Commands::Config = command {
        let rendered = toml::to_string_pretty(settings).context("Failed to render settings")?;
        return Ok(rendered.lines().map(str::to_string).collect());
    }

    let location = settings
        .default_location
        .as_deref()
        .context("No database location given; pass --uri or set default_location")?;
    debug!(location, "Connecting");

    let db = router
        .connect(location, build_options(settings, args)?)
        .with_context(|| format!("Failed to connect to {location}"))?;

    let lines = match command {
        Commands::Tables => db.table_names().await.context("Failed to list tables")?,
        Commands::Create { name } => {
            let table = db
                .create_table(name)
                .await
                .with_context(|| format!("Failed to create table {name}"))?;
            vec![format!("Created {}", table.uri)]
        }
        Commands::Open { name } => {
            let table = db
                .open_table(name)
                .await
                .with_context(|| format!("Failed to open table {name}"))?;
            vec![serde_json::to_string_pretty(&table)?]
        }
        Commands::Drop { name } => {
            db.drop_table(name)
                .await
                .with_context(|| format!("Failed to drop table {name}"))?;
            vec![format!("Dropped {name}")]
        }
        Commands::Info => describe(&db),
        Commands::Config => Vec::new(),
    };

    Ok(lines)
}

fn describe(db: &DbConnection) -> Vec<String> {
    match db {
        DbConnection::Local(local) => vec![
            "kind: embedded".to_string(),
            format!("uri: {}", local.location().uri()),
            format!("read_consistency: {:?}", local.read_consistency()),
            format!("storage_options: {}", local.storage_options().len()),
        ],
        DbConnection::Remote(remote) => vec![
            "kind: managed".to_string(),
            format!("database: {}", remote.database()),
            format!("region: {}", remote.region()),
            format!("endpoint: {}", remote.base_url()),
            format!("workers: {}", remote.worker_pool().workers()),
            format!(
                "timeouts: connect {}s, read {}s",
                remote.options().connection_timeout.as_secs_f64(),
                remote.options().read_timeout.as_secs_f64()
            ),
        ],
    }
}

/// Entry point used by the binary.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(
        cli.config.as_deref(),
        cli.log_level.as_deref(),
        &cli.connect,
    )?;
    init_logging(&settings.log_level)?;
    info!(region = %settings.region, "vecdb starting");

    let router = Router::default();
    for line in execute(&router, &settings, &cli.connect, &cli.command).await? {
        println!("{line}");
    }
    Ok(())
}
