// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference persistence for Rota.
//!
//! [`InMemoryRepository`] keeps all records behind one async lock so that
//! assignment commits re-check role uniqueness and write in a single
//! critical section. [`SeedData`] loads ministries and users from TOML.

pub mod memory;
pub mod seed;

pub use memory::{InMemoryRepository, InMemoryRepositoryBuilder};
pub use seed::SeedData;
