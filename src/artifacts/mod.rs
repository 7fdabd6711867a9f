//! Per-test artifact recording.
//!
//! Resources that observe test boundaries can keep evidence of what happened
//! during a test, such as a container's log output. [`ArtifactWriter`]
//! decides, by [`RecordingMode`], whether a test's artifact is kept and
//! writes it beneath a configured directory:
//!
//! ```text
//! <dir>/<resource>/<test name>-PASSED.log
//! <dir>/<resource>/<test name>-FAILED.log
//! ```
//!
//! Both path segments are filesystem-friendly encodings, so test names with
//! slashes or spaces never escape the artifact directory.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FilesystemError;
use crate::lifecycle::{TestDescription, filesystem_friendly};

/// Default directory for recorded artifacts, relative to the working
/// directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "target/testscope-artifacts";

/// Which test outcomes keep their artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    /// Keep artifacts for every test.
    All,
    /// Keep artifacts only for failed tests.
    #[default]
    Failing,
    /// Never keep artifacts.
    Skip,
}

impl RecordingMode {
    /// Returns whether a test with the given outcome should be recorded.
    #[must_use]
    pub const fn should_record(self, succeeded: bool) -> bool {
        match self {
            Self::All => true,
            Self::Failing => !succeeded,
            Self::Skip => false,
        }
    }

    /// Parse the lowercase name used in configuration.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "all" => Some(Self::All),
            "failing" => Some(Self::Failing),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Writes per-test artifacts beneath a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactWriter {
    dir: Utf8PathBuf,
    mode: RecordingMode,
}

impl ArtifactWriter {
    /// Create a writer rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>, mode: RecordingMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    /// Returns the artifact root directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the recording mode.
    #[must_use]
    pub const fn mode(&self) -> RecordingMode {
        self.mode
    }

    /// Returns where the artifact for `description` would be written,
    /// relative to the artifact root.
    #[must_use]
    pub fn relative_path(
        resource: &str,
        description: &TestDescription,
        succeeded: bool,
    ) -> Utf8PathBuf {
        let status = if succeeded { "PASSED" } else { "FAILED" };
        let mut path = Utf8PathBuf::from(filesystem_friendly(resource));
        path.push(format!(
            "{}-{status}.log",
            description.filesystem_friendly_name()
        ));
        path
    }

    /// Write `contents` as the artifact for one test of `resource`.
    ///
    /// Returns the full path written, or `None` when the recording mode
    /// discards this outcome.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` when the directory cannot be created or the
    /// file cannot be written.
    pub fn record(
        &self,
        resource: &str,
        description: &TestDescription,
        succeeded: bool,
        contents: &[u8],
    ) -> Result<Option<Utf8PathBuf>, FilesystemError> {
        if !self.mode.should_record(succeeded) {
            debug!(
                resource,
                test_id = description.test_id(),
                mode = ?self.mode,
                "artifact discarded"
            );
            return Ok(None);
        }

        let relative = Self::relative_path(resource, description, succeeded);
        Dir::create_ambient_dir_all(&self.dir, ambient_authority())
            .map_err(|error| filesystem_error(&self.dir, &error))?;
        let root = Dir::open_ambient_dir(&self.dir, ambient_authority())
            .map_err(|error| filesystem_error(&self.dir, &error))?;

        if let Some(parent) = relative.parent() {
            root.create_dir_all(parent)
                .map_err(|error| filesystem_error(&self.dir.join(parent), &error))?;
        }
        let target = self.dir.join(&relative);
        root.write(&relative, contents)
            .map_err(|error| filesystem_error(&target, &error))?;

        debug!(resource, path = %target, "artifact recorded");
        Ok(Some(target))
    }
}

fn filesystem_error(path: &Utf8Path, error: &io::Error) -> FilesystemError {
    if error.kind() == io::ErrorKind::PermissionDenied {
        return FilesystemError::PermissionDenied {
            path: path.as_std_path().to_path_buf(),
        };
    }
    FilesystemError::IoError {
        path: path.as_std_path().to_path_buf(),
        message: error.to_string(),
    }
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_DIR, RecordingMode::default())
    }
}

#[cfg(test)]
mod tests;
