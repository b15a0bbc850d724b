// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions.
//!
//! External adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod classifier;
pub mod clock;
pub mod handler;
pub mod repository;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use classifier::{Classification, ClassifierAdapter};
pub use clock::{Clock, SystemClock};
pub use handler::{HandlerRequest, IntentHandler};
pub use repository::RepositoryAdapter;
