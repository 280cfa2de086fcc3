//! wsl-expose CLI - Expose a WSL service on the host network
//!
//! Points a host port proxy rule at the WSL distribution's current address
//! and makes sure the firewall lets the port in.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsl_expose_core::{Config, ConfigStore};

#[derive(Parser)]
#[command(name = "wsl-expose")]
#[command(author, version, about = "Expose a WSL service on the host network")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Host port to expose (default 8000)
    #[arg(short, long, global = true, env = "WSL_EXPOSE_PORT")]
    port: Option<u16>,

    /// Port the service listens on inside WSL (defaults to --port)
    #[arg(long, global = true)]
    connect_port: Option<u16>,

    /// Firewall rule display name (default "WSL FastAPI <port>")
    #[arg(short, long, global = true, env = "WSL_EXPOSE_RULE_NAME")]
    name: Option<String>,

    /// WSL distribution to query (defaults to the default distribution)
    #[arg(short, long, global = true, env = "WSL_EXPOSE_DISTRO")]
    distro: Option<String>,

    /// Seconds to wait for WSL to report its address
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward the port to WSL and open the firewall (default)
    Up,

    /// Show current port proxy and firewall rules
    #[command(alias = "st")]
    Status,

    /// Remove the port proxy rule (and the firewall rule)
    Down {
        /// Keep the firewall rule in place
        #[arg(long)]
        keep_firewall: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show config file path
    Path,
}

/// Settings resolved from flags, environment and config file.
pub struct Settings {
    pub config: Config,
    pub port: Option<u16>,
    pub connect_port: Option<u16>,
    pub name: Option<String>,
    pub distro: Option<String>,
    pub timeout: Option<u64>,
    pub json: bool,
    pub quiet: bool,
}

impl Settings {
    /// Merge command-line values over the config file.
    async fn load(store: &ConfigStore, cli: Cli) -> anyhow::Result<Self> {
        Ok(Self {
            config: store.load().await?,
            port: cli.port,
            connect_port: cli.connect_port,
            name: cli.name,
            distro: cli.distro,
            timeout: cli.timeout,
            json: cli.json,
            quiet: cli.quiet,
        })
    }

    pub fn request(&self) -> wsl_expose_core::ExposeRequest {
        self.config
            .request(self.port, self.connect_port, self.name.clone())
    }

    pub fn distro(&self) -> Option<String> {
        self.distro.clone().or_else(|| self.config.distro.clone())
    }

    pub fn query_timeout(&self) -> std::time::Duration {
        match self.timeout {
            Some(secs) => std::time::Duration::from_secs(secs.max(1)),
            None => self.config.query_timeout(),
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn config_store(path: Option<PathBuf>) -> anyhow::Result<ConfigStore> {
    Ok(match path {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    })
}

async fn run(mut cli: Cli) -> anyhow::Result<()> {
    let store = config_store(cli.config.take())?;

    match cli.command.take().unwrap_or(Commands::Up) {
        Commands::Up => commands::up::run(&Settings::load(&store, cli).await?).await,
        Commands::Status => commands::status::run(&Settings::load(&store, cli).await?).await,
        Commands::Down { keep_firewall } => {
            commands::down::run(&Settings::load(&store, cli).await?, keep_firewall).await
        }
        // `config init --force` must work even when the current file is malformed
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&store, cli.json).await,
            ConfigAction::Init { force } => commands::config::init(&store, force).await,
            ConfigAction::Path => commands::config::path(&store),
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            let core = e.chain().find_map(|c| c.downcast_ref::<wsl_expose_core::Error>());
            if let Some(hint) = core.and_then(|c| c.hint()) {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(core.map_or(1, |c| c.exit_code()))
        }
    }
}
