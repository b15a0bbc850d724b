// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rota shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Every line is one turn for a single conversation keyed by the speaker,
//! processed against an in-memory repository.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use rota_agent::{TurnProcessor, TurnReport};
use rota_config::RotaConfig;
use rota_core::{ConversationKey, PluginAdapter, RotaError, SystemClock};
use rota_router::KeywordClassifier;
use rota_storage::{InMemoryRepository, SeedData};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

/// Builds the shell's repository, empty unless a seed file is given.
pub fn load_repository(seed: Option<&Path>) -> Result<InMemoryRepository, RotaError> {
    let Some(path) = seed else {
        return Ok(InMemoryRepository::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        RotaError::Config(format!("cannot read seed file {}: {e}", path.display()))
    })?;
    let repository = SeedData::from_toml_str(&text)?.into_repository();
    info!(seed = %path.display(), "repository seeded");
    Ok(repository)
}

/// Runs the `rota shell` interactive REPL.
pub async fn run_shell(
    config: RotaConfig,
    seed: Option<&Path>,
    speaker: &str,
) -> Result<(), RotaError> {
    let repository = Arc::new(load_repository(seed)?);
    let health = repository.health_check().await?;
    info!(
        repository = repository.name(),
        version = %repository.version(),
        ?health,
        "repository ready"
    );
    let processor = TurnProcessor::new(
        &config,
        repository.clone(),
        Arc::new(KeywordClassifier::new()),
        Arc::new(SystemClock),
    );
    let key = ConversationKey::new("cli", speaker);

    let mut rl = DefaultEditor::new()
        .map_err(|e| RotaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "rota shell".bold().green());
    println!(
        "Speaking as {}. Type {} for commands, {} to exit.\n",
        speaker.cyan(),
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/help" => print_help(),
                    "/reset" => {
                        processor.memory().reset(&key).await;
                        println!("{}", "conversation cleared".dimmed());
                    }
                    "/today" => println!("{}", processor.today().to_string().dimmed()),
                    text => {
                        let report = processor.process_text(key.clone(), text).await;
                        print_report(&report);
                    }
                }
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    repository.shutdown().await
}

fn print_help() {
    println!("  {}   clear this conversation's memory", "/reset".yellow());
    println!("  {}   show the date relative expressions resolve against", "/today".yellow());
    println!("  {}    leave the shell", "/quit".yellow());
}

fn print_report(report: &TurnReport) {
    println!("{}", report.reply);
    println!(
        "{}",
        format!(
            "[{} -> {}, {}{}]",
            report.intent,
            report.kind,
            report.final_state,
            if report.classified { "" } else { ", from memory" }
        )
        .dimmed()
    );
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rota_core::RepositoryAdapter;

    use super::*;

    const EXAMPLE_SEED: &str = include_str!("../seed.example.toml");

    #[tokio::test]
    async fn example_seed_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE_SEED.as_bytes()).unwrap();

        let repository = load_repository(Some(file.path())).unwrap();
        let ministries = repository.list_ministries().await.unwrap();
        assert_eq!(ministries.len(), 3);
        assert!(ministries.iter().any(|m| m.name == "Youth" && !m.is_active));
    }

    #[test]
    fn missing_seed_is_a_config_error() {
        let err = load_repository(Some(Path::new("/nonexistent/rota-seed.toml"))).unwrap_err();
        assert!(matches!(err, RotaError::Config(_)));
        assert!(err.to_string().contains("cannot read seed file"));
    }

    #[tokio::test]
    async fn no_seed_means_empty_repository() {
        let repository = load_repository(None).unwrap();
        assert!(repository.list_ministries().await.unwrap().is_empty());
    }
}
