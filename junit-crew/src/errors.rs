// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by junit-crew.

use camino::Utf8PathBuf;
use config::ConfigError;
use junit_crew_events::{ErrorDetails, errors::ArtifactDecodeError};
use std::{error, fmt, io, str::Utf8Error};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error(
    "failed to parse junit-crew config{}",
    .config_file.as_ref().map(|file| format!(" at `{file}`")).unwrap_or_default()
)]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Option<Utf8PathBuf>,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: Option<Utf8PathBuf>, err: ConfigError) -> Self {
        Self { config_file, err }
    }

    /// Returns the config file that failed to parse, if any.
    pub fn config_file(&self) -> Option<&Utf8PathBuf> {
        self.config_file.as_ref()
    }
}

/// An error that occurred while rendering a report to XML.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// An error occurred while writing to the output.
    #[error("error writing report")]
    Io(#[from] io::Error),

    /// An error occurred while producing XML.
    #[error("error producing report XML")]
    Xml(#[from] quick_xml::Error),

    /// The rendered report was not valid UTF-8.
    #[error("rendered report is not valid UTF-8")]
    Utf8(#[source] Utf8Error),
}

/// An error that occurred while storing an artifact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The destination directory could not be created.
    #[error("error creating archive directory `{dir}`")]
    DirCreate {
        /// The directory being created.
        dir: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: io::Error,
    },

    /// The artifact could not be written.
    #[error("error writing artifact to `{path}`")]
    Write {
        /// The file being written.
        path: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: io::Error,
    },

    /// The blocking task performing the write panicked or was cancelled.
    #[error("artifact write task for `{path}` did not complete")]
    TaskAborted {
        /// The file being written.
        path: Utf8PathBuf,

        /// The underlying join error.
        #[source]
        error: tokio::task::JoinError,
    },
}

/// An error that occurred while archiving an artifact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    /// The artifact payload could not be decoded.
    #[error("error decoding artifact")]
    Decode(#[from] ArtifactDecodeError),

    /// The artifact could not be stored.
    #[error("error storing artifact")]
    Store(#[from] StoreError),

    /// No tokio runtime was available to perform the write on.
    #[error("no async runtime available to archive artifact")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl ArchiveError {
    /// Returns the name of this error, used as the `name` of announced [`ErrorDetails`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Decode(_) => "ArtifactDecodeError",
            Self::Store(_) => "StoreError",
            Self::NoRuntime(_) => "NoRuntimeError",
        }
    }

    /// Converts this error into the form announced on the bus.
    pub fn to_details(&self) -> ErrorDetails {
        ErrorDetails::new(self.name(), DisplayErrorChain::new(self).to_string())
    }
}

/// Displays an error along with its chain of sources, separated by `: `.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut current = self.error.source();
        while let Some(source) = current {
            write!(f, ": {source}")?;
            current = source.source();
        }

        Ok(())
    }
}
