//! `cdkey` command-line front end.
//!
//! Runs one registry operation per invocation and prints the result as a JSON
//! envelope on stdout, or an error envelope on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use cdkey_core::types::AppConfig;
use cdkey_core::Registry;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cdkey_cli::{Command, run};

#[derive(Parser, Debug)]
#[command(name = "cdkey", version, about = "Issue and redeem one-time codes")]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file.
    #[arg(long, global = true, default_value = AppConfig::FILE_NAME)]
    config: PathBuf,

    /// Directory holding the packs. Overrides `storage.root`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(&cli) {
        Ok(registry) => {
            let code = run(&registry, &cli.command);
            registry.stop_all();
            code
        }
        Err(err) => {
            eprintln!("cdkey: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn start(cli: &Cli) -> anyhow::Result<Registry> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(root) = &cli.root {
        config.storage.root = root.clone();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("invalid configuration: {}", errors.join("; "));
    }

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    Registry::open_with_dispatch(config.core_config(), tracing::Dispatch::new(subscriber))
        .context("failed to open registry")
}
