// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classifier capability.

use async_trait::async_trait;

use crate::error::RotaError;
use crate::traits::adapter::PluginAdapter;

/// A coarse intent label with the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Adapter for intent classification.
///
/// The router never inspects how a label was produced. Confidence is only
/// compared against the configured threshold.
#[async_trait]
pub trait ClassifierAdapter: PluginAdapter {
    /// Classifies `text`, given the most recent prior messages (oldest first).
    async fn classify(&self, text: &str, recent: &[String]) -> Result<Classification, RotaError>;
}
