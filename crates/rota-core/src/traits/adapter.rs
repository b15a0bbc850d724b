// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by channel, classifier, and repository adapters.

use async_trait::async_trait;

use crate::error::RotaError;
use crate::types::{AdapterType, HealthStatus};

/// Supertrait of every capability the scheduling core depends on.
///
/// The core only talks to adapters through trait objects, so these methods
/// are what it can log at startup and call at shutdown.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short name used in logs, e.g. `"memory"` or `"keyword"`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Reports whether the adapter can serve calls right now.
    ///
    /// An [`HealthStatus::Unhealthy`] channel keeps the channel loop from starting.
    async fn health_check(&self) -> Result<HealthStatus, RotaError>;

    /// Releases whatever the adapter holds. Called once, after the last turn.
    async fn shutdown(&self) -> Result<(), RotaError>;
}
