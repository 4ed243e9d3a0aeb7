// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! The vocabulary shared between a test-orchestration runtime and
//! [junit-crew](https://crates.io/crates/junit-crew).
//!
//! The runtime announces lifecycle [`DomainEvent`]s (suites and scenes starting and finishing,
//! properties being recorded, the run finishing). junit-crew folds them into a JUnit report, and
//! announces its own progress back on the same bus. Binary payloads travel as [`Artifact`]s.
//!
//! All types here are serializable, so events can be exchanged as JSON documents.

mod artifact;
pub mod errors;
mod events;

pub use artifact::*;
pub use events::*;
