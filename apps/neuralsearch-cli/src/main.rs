use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use neuralsearch_core::config::{Config, Settings};

mod cli;
mod commands;

use cli::{CliArgs, Command};

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    if let Some(p) = path.filter(|p| !p.exists()) {
        anyhow::bail!("Config file {} does not exist", p.display());
    }
    let config = Config::load_from(path).map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    tracing::debug!(?settings, "resolved settings");
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose, args.quiet);

    match args.command {
        Command::SampleData { dir } => commands::sample_data(&dir),
        Command::Generate { docs, vectors, batch_size } => {
            commands::generate(&load_settings(args.config.as_deref())?, &docs, &vectors, batch_size)
        }
        Command::Index { docs, vectors, batch_size, strict, commit } => {
            commands::index(&load_settings(args.config.as_deref())?, &docs, &vectors, batch_size, strict, commit)
        }
        Command::Query(q) => commands::query(&load_settings(args.config.as_deref())?, q),
        Command::Health => commands::health(&load_settings(args.config.as_deref())?),
        Command::All => commands::all(&load_settings(args.config.as_deref())?),
        Command::Vectorize { text, json } => commands::vectorize(&load_settings(args.config.as_deref())?, &text, json),
    }
}
