// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent routing for Rota.
//!
//! Turns a raw message plus conversation context into exactly one handler
//! invocation (or a clarification prompt). Slot extraction is deterministic
//! regex and calendar arithmetic; classification is a pluggable capability
//! with a heuristic default.

pub mod classifier;
pub mod extract;
pub mod resolver;
pub mod router;

pub use classifier::KeywordClassifier;
pub use resolver::EntityResolver;
pub use router::{
    IntentRouter, IntentRouterBuilder, RouteOutcome, RouterState, TurnInput, UnrecognizedHandler,
};
