// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rota integration tests.
//!
//! Provides deterministic stand-ins for every external capability and a
//! harness that wires the full turn pipeline over an in-memory repository.
//!
//! # Components
//!
//! - [`MockChannel`] - Channel adapter with message injection and reply capture
//! - [`ScriptedClassifier`] - Classifier returning scripted or keyword-matched labels
//! - [`ManualClock`] - Clock that only moves when told to
//! - [`TestHarness`] - Turn processor over a seeded [`InMemoryRepository`](rota_storage::InMemoryRepository)

pub mod clock;
pub mod harness;
pub mod mock_channel;
pub mod scripted_classifier;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::MockChannel;
pub use scripted_classifier::ScriptedClassifier;
