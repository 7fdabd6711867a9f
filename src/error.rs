//! Semantic error types for testscope.
//!
//! Conditions a driver might inspect (which resource failed to start, which
//! hook failed, how many teardown steps broke) are modelled as `thiserror`
//! enums. Opaque reporting via `eyre::Report` is left to the caller's
//! boundary.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Error type returned by external [`Startable`](crate::lifecycle::Startable)
/// and [`TestLifecycleAware`](crate::lifecycle::TestLifecycleAware)
/// implementations.
pub type ResourceFailure = Box<dyn StdError + Send + Sync + 'static>;

/// The per-test hook that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// The hook delivered before a test body runs.
    BeforeTest,
    /// The hook delivered after a test body finished.
    AfterTest,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeTest => f.write_str("before_test"),
            Self::AfterTest => f.write_str("after_test"),
        }
    }
}

/// Errors raised while driving resource lifecycles.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A resource failed to become ready.
    #[error("failed to start resource '{resource}': {source}")]
    StartFailed {
        /// The name of the resource.
        resource: String,
        /// The failure reported by the resource.
        source: ResourceFailure,
    },

    /// A resource failed to tear down cleanly.
    #[error("failed to stop resource '{resource}': {source}")]
    StopFailed {
        /// The name of the resource.
        resource: String,
        /// The failure reported by the resource.
        source: ResourceFailure,
    },

    /// A per-test observation hook failed.
    #[error("{hook} hook failed for resource '{resource}' in test '{test_id}': {source}")]
    HookFailed {
        /// The name of the resource.
        resource: String,
        /// Which hook failed.
        hook: HookKind,
        /// The identifier of the test being observed.
        test_id: String,
        /// The failure reported by the hook.
        source: ResourceFailure,
    },

    /// A blocking lifecycle call panicked or was cancelled before completing.
    #[error("lifecycle operation '{operation}' on resource '{resource}' was interrupted: {message}")]
    Interrupted {
        /// The operation that was running.
        operation: String,
        /// The name of the resource.
        resource: String,
        /// A description of the interruption.
        message: String,
    },

    /// Several lifecycle operations failed while draining a resource set.
    #[error("{} lifecycle operations failed: {}", .failures.len(), join_messages(.failures))]
    Aggregate {
        /// Every failure, in the order it occurred.
        failures: Vec<Self>,
    },
}

impl LifecycleError {
    /// Fold a list of drained failures into a single result.
    ///
    /// An empty list is success, a single failure is returned as-is, and
    /// anything more becomes [`LifecycleError::Aggregate`].
    ///
    /// # Errors
    ///
    /// Returns the folded failure when `failures` is not empty.
    pub fn from_failures(mut failures: Vec<Self>) -> std::result::Result<(), Self> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Self::Aggregate { failures }),
        }
    }

    /// Returns the number of individual failures this error represents.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Aggregate { failures } => failures.iter().map(Self::failure_count).sum(),
            _ => 1,
        }
    }

    /// Returns the resource name for single-resource failures.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::StartFailed { resource, .. }
            | Self::StopFailed { resource, .. }
            | Self::HookFailed { resource, .. }
            | Self::Interrupted { resource, .. } => Some(resource),
            Self::Aggregate { .. } => None,
        }
    }
}

fn join_messages(failures: &[LifecycleError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while talking to the container engine.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// Failed to start a container.
    #[error("failed to start container '{container_id}': {message}")]
    StartFailed {
        /// The ID of the container that failed to start.
        container_id: String,
        /// A description of the start failure.
        message: String,
    },

    /// Failed to stop a container.
    #[error("failed to stop container '{container_id}': {message}")]
    StopFailed {
        /// The ID of the container that failed to stop.
        container_id: String,
        /// A description of the stop failure.
        message: String,
    },

    /// Failed to read a container's logs.
    #[error("failed to read logs from container '{container_id}': {message}")]
    LogsFailed {
        /// The ID of the container.
        container_id: String,
        /// A description of the failure.
        message: String,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// Permission denied when accessing a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Top-level error type for testscope.
#[derive(Debug, Error)]
pub enum TestscopeError {
    /// An error occurred while driving resource lifecycles.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred during container engine operations.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// A specialised `Result` type for testscope operations.
pub type Result<T> = std::result::Result<T, TestscopeError>;
