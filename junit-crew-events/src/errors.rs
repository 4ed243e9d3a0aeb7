// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while decoding artifacts.

use crate::ArtifactKind;
use thiserror::Error;

/// An error that occurred while decoding the base64 payload of an [`Artifact`](crate::Artifact).
#[derive(Clone, Debug, Error)]
#[error("invalid base64 payload for {kind} artifact")]
#[non_exhaustive]
pub struct ArtifactDecodeError {
    /// The kind of artifact being decoded.
    pub kind: ArtifactKind,

    /// The underlying decode error.
    #[source]
    pub error: base64::DecodeError,
}

impl ArtifactDecodeError {
    pub(crate) fn new(kind: ArtifactKind, error: base64::DecodeError) -> Self {
        Self { kind, error }
    }
}
