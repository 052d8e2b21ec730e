mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use wa_sdk::{Client, ClientConfig};

use crate::config::Config;

/// Used when `RUST_LOG` is unset. Targets are crate names: the SDK and this binary.
const DEFAULT_LOG_FILTER: &str = "wa_sdk=warn,wrap=warn";

#[derive(Parser)]
#[command(name = "wrap", version, about = "Run WrapAPI elements from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config dir>/wrapapi/config.toml)
    #[arg(long, global = true, env = "WRAPAPI_CONFIG")]
    config: Option<PathBuf>,

    /// API key (overrides the saved key)
    #[arg(long, global = true, env = "WRAPAPI_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL (overrides the saved host)
    #[arg(long, global = true, env = "WRAPAPI_HOST")]
    host: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an API element once
    Run {
        /// Element as owner/repository/name[/version]
        element: String,
        /// Input as key=value (repeatable)
        #[arg(short, long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
        /// Inputs as a JSON object
        #[arg(long, value_name = "JSON")]
        inputs: Option<String>,
        /// State token from an earlier call
        #[arg(long)]
        state_token: Option<String>,
    },

    /// Run a JSON list of calls in one session, threading the state token
    Batch {
        /// File holding [{"element": "...", "inputs": {...}}, ...]
        file: PathBuf,
        /// State token to start the session with
        #[arg(long)]
        state_token: Option<String>,
    },

    /// Save an API key to the config file
    Login {
        /// 32-character API key
        key: String,
    },

    /// Remove the saved API key
    Logout,

    /// Show the configured key and host
    Whoami,
}

/// Options every command can see.
pub struct Globals {
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    pub host: Option<String>,
}

impl Globals {
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_path)
    }

    /// Host in effect: flag or env first, then the config file.
    pub fn effective_host(&self, config: &Config) -> Result<String> {
        let mut sdk = ClientConfig::from_env()?;
        if let Some(host) = self.host.as_ref().or(config.api.host.as_ref()) {
            sdk = sdk.with_host(host.clone());
        }
        Ok(sdk.host)
    }

    pub fn client(&self) -> Result<Client> {
        let config = self.load_config()?;
        let key = self
            .api_key
            .clone()
            .or(config.api.key.clone())
            .context("no API key configured; run `wrap login <key>` or set WRAPAPI_KEY")?;

        let host = self.effective_host(&config)?;
        let sdk = ClientConfig::from_env()?.with_host(host);
        Ok(Client::builder(key).config(sdk).build()?)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let ctx = Globals {
        config_path,
        api_key: cli.api_key,
        host: cli.host,
    };

    match cli.command {
        Commands::Run { element, input, inputs, state_token } => {
            commands::run::run(&ctx, element, input, inputs, state_token).await
        }
        Commands::Batch { file, state_token } => commands::batch::run(&ctx, file, state_token).await,
        Commands::Login { key } => commands::login::run(&ctx, key),
        Commands::Logout => commands::logout::run(&ctx),
        Commands::Whoami => commands::whoami::run(&ctx),
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
    if let Some(wa_sdk::Error::Remote(remote)) = err.downcast_ref::<wa_sdk::Error>() {
        if !remote.err_types().is_empty() {
            eprintln!("{} {}", "types:".dimmed(), remote.err_types().join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_this_binary() {
        let own = format!("{}=", env!("CARGO_CRATE_NAME"));
        assert!(DEFAULT_LOG_FILTER.split(',').any(|d| d.starts_with(&own)));
        assert!(DEFAULT_LOG_FILTER.split(',').any(|d| d.starts_with("wa_sdk=")));
    }
}
