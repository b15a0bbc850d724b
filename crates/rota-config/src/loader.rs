// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment providers for each configuration layer.
//!
//! Precedence, highest first: `ROTA_*` variables, `./rota.toml`,
//! `~/.config/rota/rota.toml`, `/etc/rota/rota.toml`, compiled defaults.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RotaConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/rota/rota.toml";
pub(crate) const LOCAL_CONFIG: &str = "rota.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("rota/rota.toml"))
        .unwrap_or_default()
}

/// Extracts [`RotaConfig`] from every layer. Missing files are skipped.
pub fn load_config() -> Result<RotaConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overlaid with `toml_content`. Files and environment are ignored.
pub fn load_config_from_str(toml_content: &str) -> Result<RotaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RotaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then the file at `path`, then `ROTA_*` variables.
pub fn load_config_from_path(path: &Path) -> Result<RotaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RotaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RotaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `ROTA_MEMORY_IDLE_TIMEOUT_SECS` must map to
/// `memory.idle_timeout_secs`, not `memory.idle.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("ROTA_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("classifier_", "classifier.", 1)
            .replacen("repository_", "repository.", 1)
            .replacen("schedule_", "schedule.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[memory]\ncapacity = 12\n")?;
            jail.set_env("ROTA_MEMORY_CAPACITY", "8");
            jail.set_env("ROTA_CLASSIFIER_CONFIDENCE_THRESHOLD", "0.7");
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.memory.capacity, 8);
            assert_eq!(config.classifier.confidence_threshold, 0.7);
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(LOCAL_CONFIG, "[agent]\nname = \"grace\"\n")?;
            let config = load_config()?;
            assert_eq!(config.agent.name, "grace");
            Ok(())
        });
    }

    #[test]
    fn string_loader_ignores_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ROTA_AGENT_NAME", "from-env");
            let config = load_config_from_str("")?;
            assert_eq!(config.agent.name, "rota");
            Ok(())
        });
    }
}
