// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guarantor - an escrow deal bot for Telegram.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guarantor_config::{ConfigError, GuarantorConfig};

/// Guarantor - an escrow deal bot for Telegram.
#[derive(Parser, Debug)]
#[command(name = "guarantor", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot until SIGINT or SIGTERM.
    Serve,
    /// Validate the configuration and print the effective values.
    Check,
}

fn load(path: Option<&PathBuf>) -> Result<GuarantorConfig, Vec<ConfigError>> {
    match path {
        Some(path) => guarantor_config::load_and_validate_path(path),
        None => guarantor_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            guarantor_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            if config.telegram.bot_token.is_none() {
                eprintln!("guarantor: warning: telegram.bot_token is not set, `serve` will fail");
            }
            match guarantor_config::effective_toml(&config) {
                Ok(rendered) => {
                    println!("# guarantor: config OK");
                    print!("{rendered}");
                }
                Err(e) => {
                    eprintln!("error: cannot render configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("guarantor: use --help for available commands");
        }
    }
}
