// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [junit-crew](https://crates.io/crates/junit-crew): folding
//! test-lifecycle events into JUnit XML reports, and archiving the artifacts produced along the
//! way under content-addressed file names.
//!
//! Events are defined in the [`junit_crew_events`] crate.

pub mod archiver;
pub mod config;
pub mod errors;
pub mod reporter;
pub mod stage;
mod time;
