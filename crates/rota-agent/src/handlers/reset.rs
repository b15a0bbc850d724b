// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rota_core::{HandlerRequest, HandlerResult, IntentHandler, IntentKind, ResultKind, RotaError};
use rota_memory::MemoryStore;

/// Clears the conversation. The turn that asked for it is discarded too,
/// since the reset invalidates the turn's generation.
pub struct ResetHandler {
    memory: Arc<MemoryStore>,
}

impl ResetHandler {
    pub fn new(memory: Arc<MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl IntentHandler for ResetHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::Reset
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        self.memory.reset(&request.key).await;
        Ok(HandlerResult::new(ResultKind::Reset))
    }
}
