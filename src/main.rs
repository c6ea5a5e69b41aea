mod alert;
mod cli;
mod config;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    cli.location.apply(&mut config);

    match cli.command {
        Some(Commands::Times) => handlers::handle_times(&config)?,
        Some(Commands::Locate) => handlers::handle_locate(&config)?,
        Some(Commands::Assets) => handlers::handle_assets(&config)?,
        // No subcommand → countdown TUI
        None => handlers::handle_tui(&config)?,
    }

    Ok(())
}
