// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for Rota.
//!
//! Defaults, then `/etc/rota/rota.toml`, `~/.config/rota/rota.toml`,
//! `./rota.toml`, then `ROTA_*` variables. Unknown keys are rejected and
//! reported with a suggestion; values are checked after extraction.
//!
//! ```no_run
//! let config = rota_config::load_and_validate().expect("config errors");
//! println!("remembering {} messages", config.memory.capacity);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, ClassifierConfig, MemoryConfig, RepositoryConfig, ResponsesConfig, RotaConfig,
    ScheduleConfig,
};

/// Loads the layered configuration and validates it.
pub fn load_and_validate() -> Result<RotaConfig, Vec<ConfigError>> {
    let config = checked(loader::load_config(), layered_sources)?;
    tracing::debug!(agent = %config.agent.name, "configuration loaded");
    Ok(config)
}

/// Loads `path` (plus environment overrides) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<RotaConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_sources([path.to_path_buf()])
    })
}

/// Validates configuration given inline, with no files or environment.
pub fn load_and_validate_str(toml_content: &str) -> Result<RotaConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Source files are only read back when extraction failed, to label the
/// offending key.
fn checked(
    extracted: Result<RotaConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<RotaConfig, Vec<ConfigError>> {
    match extracted {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn layered_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG.into());
    read_sources([
        local,
        loader::user_config_path(),
        PathBuf::from(loader::SYSTEM_CONFIG),
    ])
}

fn read_sources(paths: impl IntoIterator<Item = PathBuf>) -> Vec<(String, String)> {
    paths
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
