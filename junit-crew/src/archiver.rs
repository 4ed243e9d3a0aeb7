// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive artifacts under content-addressed file names.
//!
//! The main entry point is [`ArtifactArchiver`], which writes artifacts through an
//! [`ArtifactStore`] and announces each write on the [`Stage`](crate::stage::Stage).

mod imp;
pub mod naming;
mod store;

pub use imp::*;
pub use store::*;
