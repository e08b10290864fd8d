//! keysynth - play the synth engine from a computer keyboard
//!
//! Run with: cargo run -- [--config keysynth.toml] [--log-file keysynth.log]

mod app;
mod keys;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keysynth::EngineConfig;

/// Polyphonic keyboard synth in the terminal.
#[derive(Parser, Debug)]
#[command(name = "keysynth")]
#[command(version)]
struct Args {
    /// TOML file with engine settings layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here (the terminal itself is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Start with the arpeggiator enabled
    #[arg(long)]
    arp: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_toml_str(&text)
                .wrap_err_with(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    app::run(config, args.arp)
}

fn init_logging(path: &PathBuf) -> EyreResult<()> {
    use tracing_subscriber::EnvFilter;

    let file = File::create(path).wrap_err_with(|| format!("failed to create {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
