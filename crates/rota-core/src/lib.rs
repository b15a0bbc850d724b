// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rota scheduling assistant.
//!
//! This crate provides the error types, domain records, slot vocabulary, and
//! capability traits shared by every other Rota crate. External collaborators
//! (classifier, repository, transport) implement the traits defined here.

pub mod entities;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use entities::{
    DateRange, IntentKind, MinistryRef, RecurrenceRule, ResolvedEntities, Slot, SlotSource,
    SlotValue, UserRef,
};
pub use error::{RotaError, ScheduleError};
pub use result::{HandlerResult, ResultKind};
pub use types::*;

pub use traits::{
    ChannelAdapter, Classification, ClassifierAdapter, Clock, HandlerRequest, IntentHandler,
    PluginAdapter, RepositoryAdapter, SystemClock,
};
