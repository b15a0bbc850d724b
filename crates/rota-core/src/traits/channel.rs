// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the inbound transport and outbound replies.

use async_trait::async_trait;

use crate::error::RotaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, OutboundMessage};

/// Adapter for a bidirectional message transport (WhatsApp webhook, terminal, ...).
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Receives the next inbound message. `Ok(None)` means the transport closed.
    async fn receive(&self) -> Result<Option<InboundMessage>, RotaError>;

    /// Delivers a formatted reply.
    async fn send(&self, msg: OutboundMessage) -> Result<(), RotaError>;
}
