mod cli;
mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use regtune_core::config::load_dotenv;
use regtune_core::Config;

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    match run(args, &terminal) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "regtune failed");
            if terminal.print_error(&format!("{e:#}")).is_err() {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs, terminal: &Terminal) -> Result<ExitCode> {
    load_dotenv();
    let mut config = Config::from_env();

    match args.command {
        Command::Validate(catalog) => {
            commands::apply_catalog_overrides(&mut config, &catalog);
            config.log_summary();
            commands::validate(&config, terminal)
        }
        Command::Plan(plan) => {
            commands::apply_catalog_overrides(&mut config, &plan.catalog);
            commands::apply_profile_overrides(&mut config, &plan.profile);
            config.log_summary();
            commands::plan(&config, terminal)
        }
        Command::Apply(apply) => {
            commands::apply_catalog_overrides(&mut config, &apply.catalog);
            commands::apply_profile_overrides(&mut config, &apply.profile);
            if let Some(store) = &apply.store {
                config.store.backend = store.clone();
            }
            if let Some(file) = &apply.store_file {
                config.store.file = file.clone();
            }
            config.log_summary();
            commands::apply(&config, &apply, terminal)
        }
    }
}
