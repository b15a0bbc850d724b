// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rota - a conversational assistant for volunteer scheduling.
//!
//! This is the binary entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod shell;

/// Rota - a conversational assistant for volunteer scheduling.
#[derive(Parser, Debug)]
#[command(name = "rota", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive REPL session over an in-memory repository.
    Shell {
        /// TOML file with `[[ministries]]` and `[[users]]` to preload.
        #[arg(long)]
        seed: Option<PathBuf>,
        /// Sender id for the session; matched against user ids and phone numbers.
        #[arg(long, default_value = "local")]
        speaker: String,
    },
    /// Load and validate configuration, then report problems.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match rota_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rota_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Shell { seed, speaker }) => {
            init_tracing(&config.agent.log_level);
            if let Err(e) = shell::run_shell(config, seed.as_deref(), &speaker).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "rota: configuration OK (agent.name={}, memory.capacity={})",
                config.agent.name, config.memory.capacity
            );
        }
        None => {
            println!("rota: use --help for available commands");
        }
    }
}

/// Logs go to stderr so they never mix with replies on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rota={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = rota_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "rota");
    }

    #[test]
    fn shell_arguments_parse() {
        let cli = Cli::parse_from(["rota", "shell", "--seed", "seed.toml", "--speaker", "maria"]);
        match cli.command {
            Some(Commands::Shell { seed, speaker }) => {
                assert_eq!(seed, Some(PathBuf::from("seed.toml")));
                assert_eq!(speaker, "maria");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_config_is_kebab_case() {
        let cli = Cli::parse_from(["rota", "check-config"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }
}
