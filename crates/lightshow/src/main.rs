//! Light-Show - Art-Net driven moving lights
//!
//! Receives a lighting console's Art-Net output and drives the configured
//! fixtures at a fixed tick rate.

#![warn(missing_docs)]

mod headless;
mod logging_setup;
mod runner;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lightshow_core::{LogConfig, ShowSettings};
use std::path::{Path, PathBuf};
use tracing::info;

/// Light-Show - Art-Net driven moving lights
#[derive(Parser)]
#[command(name = "lightshow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive Art-Net and run the show until Ctrl-C
    Run {
        /// Show settings (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Listen endpoint, overrides the settings
        #[arg(long, value_name = "IP[:PORT]")]
        listen: Option<String>,

        /// Forward endpoint, overrides the settings
        #[arg(long, value_name = "IP[:PORT]")]
        forward: Option<String>,

        /// Height of a floor plane beams stop at
        #[arg(long)]
        floor: Option<f32>,
    },

    /// Validate show settings and fixture bindings
    Check {
        /// Show settings (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn load(path: &Path) -> Result<ShowSettings> {
    ShowSettings::load(path).with_context(|| format!("Failed to load show settings {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            listen,
            forward,
            floor,
        } => {
            let settings = load(&config)?;
            let _log_guard = logging_setup::init(&settings.log)?;

            info!("==========================================");
            info!("===     Light-Show Session Started     ===");
            info!("==========================================");

            runner::run(
                settings,
                runner::RunOptions {
                    listen,
                    forward,
                    floor,
                },
            )
            .await
        }
        Commands::Check { config } => {
            let _log_guard = logging_setup::init(&LogConfig::default())?;
            let settings = load(&config)?;
            let table = settings.validate()?;

            println!(
                "{}: {} fixtures on universes {:?}, listening on {}",
                config.display(),
                table.len(),
                table.used_universes(),
                settings.art_net.listen
            );
            Ok(())
        }
    }
}
