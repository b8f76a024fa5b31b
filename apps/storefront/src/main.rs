//! # storefront
//!
//! Command-line harness for the GroceryGuru storefront.
//!
//! ```text
//! storefront catalog                          list products and prices
//! storefront cart add:p1 add:p1 set:p2=3      apply cart edits, print totals
//! storefront recover --email a@b.com          forgot → verify → reset
//! storefront login --email a@b.com            submit the login form
//! storefront config show | init               effective / default config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grocery_client::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(version)]
#[command(about = "GroceryGuru storefront harness")]
struct Cli {
    /// Path to storefront.toml (default: platform config directory)
    #[arg(long, global = true, env = "GROCERY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    Catalog {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Apply cart edits in order and print the resulting cart
    Cart {
        /// Edits: add:<id>, remove:<id>, set:<id>=<qty>
        #[arg(value_name = "EDIT", required = true)]
        edits: Vec<commands::CartEdit>,
    },

    /// Recover a forgotten password
    Recover {
        #[arg(long)]
        email: String,

        /// Code from the email (prompted when omitted)
        #[arg(long)]
        code: Option<String>,

        /// New password (prompted when omitted)
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Log in and print the session
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Config {
        command: ConfigCommands::Init,
    } = &cli.command
    {
        return commands::config_init(cli.config);
    }

    let config = StorefrontConfig::load(cli.config.clone()).context("loading configuration")?;
    let command = cli.command.name();
    info!(
        command,
        base_url = %config.api.base_url,
        accounts = %config.api.accounts,
        "Running storefront command"
    );

    let outcome = match cli.command {
        Commands::Catalog { category } => commands::catalog(&config, category.as_deref()),
        Commands::Cart { edits } => commands::cart(&config, &edits),
        Commands::Recover {
            email,
            code,
            new_password,
        } => commands::recover(&config, &email, code, new_password).await,
        Commands::Login { email, password } => commands::login(&config, &email, password).await,
        Commands::Config { .. } => commands::config_show(&config),
    };

    match &outcome {
        Ok(()) => info!(command, "Command finished"),
        Err(e) => error!(command, error = %e, "Command failed"),
    }
    outcome
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Catalog { .. } => "catalog",
            Commands::Cart { .. } => "cart",
            Commands::Recover { .. } => "recover",
            Commands::Login { .. } => "login",
            Commands::Config { .. } => "config",
        }
    }
}

/// Installs the log subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,grocery=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
