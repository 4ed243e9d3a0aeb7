// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Artifact, ArtifactKind};
use chrono::{DateTime, FixedOffset};
use newtype_uuid::{TypedUuid, TypedUuidKind, TypedUuidTag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of [`TypedUuid`] used to pair asynchronous operation announcements.
pub enum CorrelationKind {}

impl TypedUuidKind for CorrelationKind {
    #[inline]
    fn tag() -> TypedUuidTag {
        const TAG: TypedUuidTag = TypedUuidTag::new("correlation");
        TAG
    }
}

/// Pairs an [`AsyncOperationAttempted`](DomainEvent::AsyncOperationAttempted) announcement with
/// its terminal announcement.
pub type CorrelationId = TypedUuid<CorrelationKind>;

/// An event announced on the bus shared by the orchestration runtime and its listeners.
///
/// Inbound lifecycle events describe the progress of a test run. Outbound events are announced by
/// junit-crew as it archives artifacts. Listeners ignore variants they have no use for, and any
/// event type not known to this version deserializes to [`DomainEvent::Unknown`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    /// A test suite started.
    TestSuiteStarts {
        /// The name of the suite.
        name: String,
    },

    /// The currently running test suite finished.
    TestSuiteFinished {
        /// The name of the suite, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// A scene (test case) started.
    SceneStarts {
        /// The name of the scene.
        name: String,
    },

    /// The currently running scene finished.
    SceneFinished {
        /// The name of the scene, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,

        /// How the scene ended.
        outcome: Outcome,
    },

    /// A key/value property was recorded against the current suite.
    PropertyRecorded {
        /// The property name.
        name: String,

        /// The property value.
        value: String,
    },

    /// An activity started within the current scene.
    ActivityStarts {
        /// The runtime's identifier for the activity.
        activity_id: String,

        /// A description of the activity.
        name: String,
    },

    /// The test run is about to finish.
    TestRunFinishes {
        /// The time at which the run finished.
        timestamp: DateTime<FixedOffset>,
    },

    /// An artifact was produced and is ready to be archived.
    ArtifactGenerated {
        /// The name of the artifact.
        name: String,

        /// The artifact itself.
        artifact: Artifact,
    },

    /// An asynchronous operation was started.
    AsyncOperationAttempted {
        /// A human-readable description of the operation.
        description: String,

        /// Identifies the operation.
        correlation_id: CorrelationId,
    },

    /// An asynchronous operation completed successfully.
    AsyncOperationCompleted {
        /// A human-readable description of the result.
        description: String,

        /// Identifies the operation.
        correlation_id: CorrelationId,
    },

    /// An asynchronous operation failed.
    AsyncOperationFailed {
        /// The error the operation failed with.
        error: ErrorDetails,

        /// Identifies the operation.
        correlation_id: CorrelationId,
    },

    /// An artifact was written to the archive.
    ArtifactArchived {
        /// The name of the artifact.
        name: String,

        /// The kind of artifact.
        kind: ArtifactKind,

        /// The path of the archived file, relative to the archive directory.
        path: String,
    },

    /// An event not known to this version.
    #[serde(other)]
    Unknown,
}

impl DomainEvent {
    /// Returns the name of this event type, as used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TestSuiteStarts { .. } => "TestSuiteStarts",
            Self::TestSuiteFinished { .. } => "TestSuiteFinished",
            Self::SceneStarts { .. } => "SceneStarts",
            Self::SceneFinished { .. } => "SceneFinished",
            Self::PropertyRecorded { .. } => "PropertyRecorded",
            Self::ActivityStarts { .. } => "ActivityStarts",
            Self::TestRunFinishes { .. } => "TestRunFinishes",
            Self::ArtifactGenerated { .. } => "ArtifactGenerated",
            Self::AsyncOperationAttempted { .. } => "AsyncOperationAttempted",
            Self::AsyncOperationCompleted { .. } => "AsyncOperationCompleted",
            Self::AsyncOperationFailed { .. } => "AsyncOperationFailed",
            Self::ArtifactArchived { .. } => "ArtifactArchived",
            Self::Unknown => "Unknown",
        }
    }

    /// Parses an event from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// How a scene ended, as decided by the orchestration runtime.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Outcome {
    /// The scene passed.
    ExecutionSuccessful,

    /// An assertion in the scene did not hold.
    ExecutionFailedWithAssertionError {
        /// The assertion error.
        error: ErrorDetails,
    },

    /// The scene failed with an unexpected error.
    ExecutionFailedWithError {
        /// The error.
        error: ErrorDetails,
    },

    /// The scene could not run because its environment was broken.
    ExecutionCompromised {
        /// The error.
        error: ErrorDetails,
    },

    /// The scene is not implemented yet.
    ImplementationPending {
        /// The error, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorDetails>,
    },

    /// The scene was skipped.
    ExecutionSkipped,

    /// The scene was ignored.
    ExecutionIgnored {
        /// The error, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorDetails>,
    },
}

impl Outcome {
    /// Classifies this outcome into one of the four JUnit result kinds.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::ExecutionSuccessful => OutcomeKind::Pass,
            Self::ExecutionFailedWithAssertionError { .. } => OutcomeKind::Failure,
            Self::ExecutionSkipped | Self::ExecutionIgnored { .. } => OutcomeKind::Skipped,
            Self::ExecutionFailedWithError { .. }
            | Self::ExecutionCompromised { .. }
            | Self::ImplementationPending { .. } => OutcomeKind::Error,
        }
    }

    /// Returns the error attached to this outcome, if any.
    pub fn error(&self) -> Option<&ErrorDetails> {
        match self {
            Self::ExecutionSuccessful | Self::ExecutionSkipped => None,
            Self::ExecutionFailedWithAssertionError { error }
            | Self::ExecutionFailedWithError { error }
            | Self::ExecutionCompromised { error } => Some(error),
            Self::ImplementationPending { error } | Self::ExecutionIgnored { error } => {
                error.as_ref()
            }
        }
    }

    /// Returns the name of this outcome type, as used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ExecutionSuccessful => "ExecutionSuccessful",
            Self::ExecutionFailedWithAssertionError { .. } => "ExecutionFailedWithAssertionError",
            Self::ExecutionFailedWithError { .. } => "ExecutionFailedWithError",
            Self::ExecutionCompromised { .. } => "ExecutionCompromised",
            Self::ImplementationPending { .. } => "ImplementationPending",
            Self::ExecutionSkipped => "ExecutionSkipped",
            Self::ExecutionIgnored { .. } => "ExecutionIgnored",
        }
    }
}

/// The JUnit classification of an [`Outcome`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OutcomeKind {
    /// The test passed.
    Pass,

    /// The test failed: an expected kind of problem, such as an assertion.
    Failure,

    /// The test errored: an unexpected kind of problem.
    Error,

    /// The test was skipped.
    Skipped,
}

/// A serialized error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// The name (type) of the error, for example `AssertionError`.
    pub name: String,

    /// The error message.
    pub message: String,

    /// A long-form description, typically a stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorDetails {
    /// Creates a new `ErrorDetails` without a stack.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Sets the stack.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}
