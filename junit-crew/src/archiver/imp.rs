// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ArtifactStore, naming::file_name_for};
use crate::{
    config::ArchiveConfig,
    errors::{ArchiveError, DisplayErrorChain},
    stage::Stage,
};
use camino::{Utf8Path, Utf8PathBuf};
use junit_crew_events::{Artifact, CorrelationId, DomainEvent};
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinSet};
use tracing::{debug, warn};

/// The name operations are described with in announcements.
const DESCRIPTION_PREFIX: &str = "[ArtifactArchiver]";

/// Writes artifacts to an [`ArtifactStore`], announcing progress on the [`Stage`].
///
/// Every archive operation announces [`DomainEvent::AsyncOperationAttempted`] before the write
/// starts. Once the write finishes, it announces either [`DomainEvent::AsyncOperationCompleted`]
/// followed by [`DomainEvent::ArtifactArchived`], or [`DomainEvent::AsyncOperationFailed`]. All
/// announcements for an operation carry the same [`CorrelationId`].
///
/// Writes run concurrently on the current tokio runtime. Failures are never returned to the
/// caller: they are only announced.
#[derive(Debug)]
pub struct ArtifactArchiver<S> {
    store: Arc<S>,
    stage: Stage,
    config: ArchiveConfig,
    pending: JoinSet<()>,
}

impl<S: ArtifactStore> ArtifactArchiver<S> {
    /// Creates a new archiver.
    pub fn new(store: S, stage: Stage, config: ArchiveConfig) -> Self {
        Self {
            store: Arc::new(store),
            stage,
            config,
            pending: JoinSet::new(),
        }
    }

    /// Handles a newly generated artifact, archiving it if its kind is configured to be archived.
    ///
    /// Returns the path the artifact will be written to, relative to the store, or `None` if the
    /// artifact was skipped.
    pub fn notify_generated(&mut self, name: &str, artifact: Artifact) -> Option<Utf8PathBuf> {
        if !self.config.should_archive(artifact.kind()) {
            debug!(
                "not archiving {} artifact `{name}`: kind is not configured",
                artifact.kind(),
            );
            return None;
        }

        Some(self.archive(name, artifact))
    }

    /// Archives an artifact regardless of its kind.
    ///
    /// The write happens in the background. The returned path is relative to the store, and is
    /// the same for identical artifacts with the same name.
    pub fn archive(&mut self, name: &str, artifact: Artifact) -> Utf8PathBuf {
        self.reap_finished();

        let kind = artifact.kind();
        let relative_path = Utf8PathBuf::from(file_name_for(
            self.config.prefix_for(kind),
            name,
            &artifact,
            kind.extension(),
        ));
        let correlation_id = CorrelationId::new_v4();

        self.stage.announce(DomainEvent::AsyncOperationAttempted {
            description: format!("{DESCRIPTION_PREFIX} Saving '{relative_path}'..."),
            correlation_id,
        });

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(error) => {
                self.announce_failure(&relative_path, ArchiveError::from(error), correlation_id);
                return relative_path;
            }
        };

        let store = Arc::clone(&self.store);
        let stage = self.stage.clone();
        let name = name.to_owned();
        let task_path = relative_path.clone();
        self.pending.spawn_on(
            async move {
                let result = write_artifact(&*store, &task_path, &artifact).await;
                match result {
                    Ok(path) => {
                        stage.announce(DomainEvent::AsyncOperationCompleted {
                            description: format!("{DESCRIPTION_PREFIX} Saved '{path}'"),
                            correlation_id,
                        });
                        stage.announce(DomainEvent::ArtifactArchived {
                            name,
                            kind,
                            path: task_path.into_string(),
                        });
                    }
                    Err(error) => {
                        warn!(
                            "failed to archive `{task_path}`: {}",
                            DisplayErrorChain::new(&error),
                        );
                        stage.announce(DomainEvent::AsyncOperationFailed {
                            error: error.to_details(),
                            correlation_id,
                        });
                    }
                }
            },
            &handle,
        );

        relative_path
    }

    /// Returns the number of writes that have been started but not yet waited for.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Waits for all outstanding writes to finish.
    ///
    /// Every terminal announcement for those writes has been made by the time this returns.
    pub async fn wait_for_pending(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(error) = result {
                warn!("archive task did not complete: {error}");
            }
        }
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.pending.try_join_next() {
            if let Err(error) = result {
                warn!("archive task did not complete: {error}");
            }
        }
    }

    fn announce_failure(
        &self,
        relative_path: &Utf8Path,
        error: ArchiveError,
        correlation_id: CorrelationId,
    ) {
        warn!(
            "failed to archive `{relative_path}`: {}",
            DisplayErrorChain::new(&error),
        );
        self.stage.announce(DomainEvent::AsyncOperationFailed {
            error: error.to_details(),
            correlation_id,
        });
    }
}

async fn write_artifact<S: ArtifactStore>(
    store: &S,
    relative_path: &Utf8Path,
    artifact: &Artifact,
) -> Result<Utf8PathBuf, ArchiveError> {
    let contents = artifact.decoded()?;
    let path = store.store(relative_path, contents).await?;
    Ok(path)
}
