//! Temporary file management for one resolution run.
//!
//! Every extraction target is registered with a [`TempArtifacts`] guard
//! before ffmpeg is asked to write it. The guard deletes all registered paths
//! when [`TempArtifacts::release_all`] is called or, at the latest, when it is
//! dropped, so early returns and propagated errors clean up as well.

use std::io;
use std::path::{Path, PathBuf};

/// Scoped owner of the temporary files created during one resolution.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `path`; it will be deleted when the run ends.
    pub fn register(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        log::debug!("Registered temporary file: {}", path.display());
        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        path
    }

    /// Paths registered so far and not yet released.
    #[must_use]
    pub fn registered(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Deletes every registered path that still exists.
    ///
    /// Paths that are already gone are ignored; other deletion errors are
    /// logged and otherwise ignored. Calling this again is a no-op.
    pub fn release_all(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly(&path);
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed temporary file: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "Failed to remove temporary file {}: {}",
            path.display(),
            e
        ),
    }
}
