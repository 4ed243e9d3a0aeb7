// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build JUnit reports out of test-lifecycle events.
//!
//! The main structure in this module is [`EventDispatcher`], which feeds events into a
//! [`ReportAggregator`] and announces the rendered [`ReportTree`] once the run finishes.

mod aggregator;
mod dispatcher;
mod render;
mod tree;

pub use aggregator::*;
pub use dispatcher::*;
pub use tree::*;
