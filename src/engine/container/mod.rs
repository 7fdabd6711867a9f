//! Existing engine containers as test resources.
//!
//! [`EngineContainer`] adapts a container that already exists on the engine
//! into a [`Startable`]: `start` and `stop` map to the engine's container
//! start and stop calls. It never pulls images or creates containers.
//!
//! With log capture enabled the container also observes test boundaries,
//! saving its log output after each test according to the configured
//! [`RecordingMode`](crate::artifacts::RecordingMode).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bollard::query_parameters::{
    LogsOptionsBuilder, StartContainerOptions, StopContainerOptionsBuilder,
};
use bollard::{Docker, errors::Error as BollardError};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::artifacts::ArtifactWriter;
use crate::error::{ContainerError, ResourceFailure};
use crate::lifecycle::{Startable, TestDescription, TestFailure, TestLifecycleAware};

/// HTTP status the engine returns when a container is already in the
/// requested state.
const NOT_MODIFIED: u16 = 304;

/// Boxed future type returned by [`ContainerLifecycleClient::start_container`]
/// and [`ContainerLifecycleClient::stop_container`].
pub type ContainerActionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), BollardError>> + Send + 'a>>;

/// Boxed future type returned by [`ContainerLifecycleClient::container_logs`].
pub type ContainerLogsFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, BollardError>> + Send + 'a>>;

/// Behaviour required to drive an existing container's lifecycle.
///
/// This abstraction keeps container resources testable without a live
/// daemon.
pub trait ContainerLifecycleClient: Send + Sync {
    /// Start a created or stopped container.
    fn start_container(&self, container_id: &str) -> ContainerActionFuture<'_>;

    /// Stop a running container, waiting up to `timeout_secs` before the
    /// engine kills it.
    fn stop_container(
        &self,
        container_id: &str,
        timeout_secs: Option<i32>,
    ) -> ContainerActionFuture<'_>;

    /// Fetch the container's combined stdout and stderr output.
    fn container_logs(&self, container_id: &str) -> ContainerLogsFuture<'_>;
}

impl ContainerLifecycleClient for Docker {
    fn start_container(&self, container_id: &str) -> ContainerActionFuture<'_> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move {
            Self::start_container(self, &container_id_owned, None::<StartContainerOptions>).await
        })
    }

    fn stop_container(
        &self,
        container_id: &str,
        timeout_secs: Option<i32>,
    ) -> ContainerActionFuture<'_> {
        let container_id_owned = String::from(container_id);
        let options = timeout_secs.map(|secs| StopContainerOptionsBuilder::new().t(secs).build());
        Box::pin(async move { Self::stop_container(self, &container_id_owned, options).await })
    }

    fn container_logs(&self, container_id: &str) -> ContainerLogsFuture<'_> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move {
            let options = LogsOptionsBuilder::new().stdout(true).stderr(true).build();
            self.logs(&container_id_owned, Some(options))
                .try_fold(Vec::new(), |mut buffer, chunk| async move {
                    buffer.extend_from_slice(&chunk.into_bytes());
                    Ok(buffer)
                })
                .await
        })
    }
}

/// A container that already exists on the engine, managed as a test
/// resource.
///
/// The blocking [`Startable`] calls drive the engine through `runtime`. They
/// run on Tokio's blocking pool when invoked by a listener.
pub struct EngineContainer<C> {
    client: Arc<C>,
    runtime: tokio::runtime::Handle,
    container_id: String,
    name: String,
    stop_timeout_secs: Option<i32>,
    log_capture: Option<ArtifactWriter>,
}

impl<C: ContainerLifecycleClient> EngineContainer<C> {
    /// Wrap the container `container_id`.
    #[must_use]
    pub fn new(
        client: Arc<C>,
        runtime: tokio::runtime::Handle,
        container_id: impl Into<String>,
    ) -> Self {
        let id = container_id.into();
        Self {
            client,
            runtime,
            name: id.clone(),
            container_id: id,
            stop_timeout_secs: None,
            log_capture: None,
        }
    }

    /// Use `name` in logs, errors and artifact paths instead of the id.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Give the container `secs` seconds to exit before the engine kills it.
    #[must_use]
    pub const fn with_stop_timeout(mut self, secs: i32) -> Self {
        self.stop_timeout_secs = Some(secs);
        self
    }

    /// Save the container's logs after each test through `writer`.
    #[must_use]
    pub fn with_log_capture(mut self, writer: ArtifactWriter) -> Self {
        self.log_capture = Some(writer);
        self
    }

    /// Returns the engine container id.
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Start the container (async version).
    ///
    /// A container that is already running counts as started.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::StartFailed` when the engine rejects the
    /// request.
    pub async fn start_async(&self) -> Result<(), ContainerError> {
        debug!(container = %self.container_id, name = %self.name, "starting container");
        match self.client.start_container(&self.container_id).await {
            Ok(()) => Ok(()),
            Err(error) if is_not_modified(&error) => Ok(()),
            Err(error) => Err(ContainerError::StartFailed {
                container_id: self.container_id.clone(),
                message: error.to_string(),
            }),
        }
    }

    /// Stop the container (async version).
    ///
    /// A container that is already stopped counts as stopped.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::StopFailed` when the engine rejects the
    /// request.
    pub async fn stop_async(&self) -> Result<(), ContainerError> {
        debug!(container = %self.container_id, name = %self.name, "stopping container");
        match self
            .client
            .stop_container(&self.container_id, self.stop_timeout_secs)
            .await
        {
            Ok(()) => Ok(()),
            Err(error) if is_not_modified(&error) => Ok(()),
            Err(error) => Err(ContainerError::StopFailed {
                container_id: self.container_id.clone(),
                message: error.to_string(),
            }),
        }
    }

    /// Fetch the container's log output (async version).
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::LogsFailed` when the engine cannot stream the
    /// logs.
    pub async fn logs_async(&self) -> Result<Vec<u8>, ContainerError> {
        self.client
            .container_logs(&self.container_id)
            .await
            .map_err(|error| ContainerError::LogsFailed {
                container_id: self.container_id.clone(),
                message: error.to_string(),
            })
    }
}

impl<C: ContainerLifecycleClient + 'static> Startable for EngineContainer<C> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn start(&self) -> Result<(), ResourceFailure> {
        self.runtime.block_on(self.start_async())?;
        Ok(())
    }

    fn stop(&self) -> Result<(), ResourceFailure> {
        self.runtime.block_on(self.stop_async())?;
        Ok(())
    }

    fn lifecycle_aware(self: Arc<Self>) -> Option<Arc<dyn TestLifecycleAware>> {
        if self.log_capture.is_none() {
            return None;
        }
        Some(self)
    }
}

impl<C: ContainerLifecycleClient + 'static> TestLifecycleAware for EngineContainer<C> {
    fn after_test(
        &self,
        description: &TestDescription,
        failure: Option<&TestFailure>,
    ) -> Result<(), ResourceFailure> {
        let Some(writer) = &self.log_capture else {
            return Ok(());
        };
        let succeeded = failure.is_none();
        if !writer.mode().should_record(succeeded) {
            return Ok(());
        }

        let logs = self.runtime.block_on(self.logs_async())?;
        writer.record(&self.name, description, succeeded, &logs)?;
        Ok(())
    }
}

impl<C> std::fmt::Debug for EngineContainer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContainer")
            .field("container_id", &self.container_id)
            .field("name", &self.name)
            .field("stop_timeout_secs", &self.stop_timeout_secs)
            .field("log_capture", &self.log_capture)
            .finish_non_exhaustive()
    }
}

const fn is_not_modified(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError {
            status_code: NOT_MODIFIED,
            ..
        }
    )
}
