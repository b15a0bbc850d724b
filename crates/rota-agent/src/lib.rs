// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn processing for the Rota scheduling assistant.
//!
//! The [`TurnProcessor`] is the inbound entry point: it takes one raw
//! message and returns one reply. [`ChannelLoop`] drives a channel adapter
//! through it, serially per conversation and in parallel across them.

pub mod channel_loop;
pub mod formatter;
pub mod handlers;
pub mod processor;

pub use channel_loop::ChannelLoop;
pub use formatter::{default_template, ResponseFormatter, FALLBACK_REPLY};
pub use handlers::HandlerDeps;
pub use processor::{TurnProcessor, TurnReport};
