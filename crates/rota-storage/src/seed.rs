// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOML seed files for the in-memory repository.
//!
//! ```toml
//! [[ministries]]
//! name = "Worship"
//! leader = "maria"
//!
//! [[users]]
//! id = "maria"
//! first_name = "Maria"
//! last_name = "Silva"
//! phone_number = "5511999990000"
//! unavailable = ["2024-01-14"]
//! ```

use chrono::NaiveDate;
use serde::Deserialize;

use rota_core::{Ministry, MinistryId, RotaError, UserId, UserRecord};

use crate::memory::{InMemoryRepository, InMemoryRepositoryBuilder};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedMinistry {
    /// Defaults to the lowercased name with spaces replaced by dashes.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub unavailable: Vec<NaiveDate>,
}

/// Ministries and users to preload into an [`InMemoryRepository`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub ministries: Vec<SeedMinistry>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl SeedData {
    pub fn from_toml_str(s: &str) -> Result<Self, RotaError> {
        let seed: SeedData =
            toml::from_str(s).map_err(|e| RotaError::Config(format!("invalid seed file: {e}")))?;
        seed.check()?;
        Ok(seed)
    }

    /// Leaders must name a seeded user.
    fn check(&self) -> Result<(), RotaError> {
        for m in &self.ministries {
            if let Some(leader) = &m.leader
                && !self.users.iter().any(|u| &u.id == leader)
            {
                return Err(RotaError::Config(format!(
                    "ministry `{}` names unknown leader `{leader}`",
                    m.name
                )));
            }
        }
        Ok(())
    }

    pub fn apply(self, mut builder: InMemoryRepositoryBuilder) -> InMemoryRepositoryBuilder {
        for m in self.ministries {
            let id = m
                .id
                .unwrap_or_else(|| m.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"));
            builder = builder.ministry(Ministry {
                id: MinistryId(id),
                name: m.name,
                leader: m.leader.map(UserId),
                is_active: m.active,
            });
        }
        for u in self.users {
            let id = UserId(u.id);
            for date in u.unavailable {
                builder = builder.unavailable(&id, date);
            }
            builder = builder.user(UserRecord {
                id,
                first_name: u.first_name,
                last_name: u.last_name,
                phone_number: u.phone_number,
                is_active: u.active,
                is_available: u.available,
            });
        }
        builder
    }

    pub fn into_repository(self) -> InMemoryRepository {
        self.apply(InMemoryRepository::builder()).build()
    }
}
