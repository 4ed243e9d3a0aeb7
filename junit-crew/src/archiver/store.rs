// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::StoreError;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use tracing::debug;

/// A destination that archived artifacts are written to.
pub trait ArtifactStore: Send + Sync + 'static {
    /// Writes `contents` to `relative_path` within the store, returning the path it was written to.
    fn store(
        &self,
        relative_path: &Utf8Path,
        contents: Vec<u8>,
    ) -> impl Future<Output = Result<Utf8PathBuf, StoreError>> + Send;
}

/// An [`ArtifactStore`] backed by a directory on the local filesystem.
///
/// Files are written atomically on a blocking thread, and existing files with the same name are
/// replaced.
#[derive(Clone, Debug)]
pub struct FileSystemStore {
    root: Utf8PathBuf,
}

impl FileSystemStore {
    /// Creates a new store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl ArtifactStore for FileSystemStore {
    fn store(
        &self,
        relative_path: &Utf8Path,
        contents: Vec<u8>,
    ) -> impl Future<Output = Result<Utf8PathBuf, StoreError>> + Send {
        let path = self.root.join(relative_path);

        async move {
            let task_path = path.clone();
            tokio::task::spawn_blocking(move || write_atomic(task_path, &contents))
                .await
                .map_err(|error| StoreError::TaskAborted { path, error })?
        }
    }
}

fn write_atomic(path: Utf8PathBuf, contents: &[u8]) -> Result<Utf8PathBuf, StoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|error| StoreError::DirCreate {
            dir: dir.to_owned(),
            error,
        })?;
    }

    AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
        .write(|file| file.write_all(contents))
        .map_err(|err| {
            let error = match err {
                atomicwrites::Error::Internal(error) | atomicwrites::Error::User(error) => error,
            };
            StoreError::Write {
                path: path.clone(),
                error,
            }
        })?;

    debug!("wrote {} bytes to {path}", contents.len());
    Ok(path)
}
