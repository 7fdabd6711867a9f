//! Resources shared by every spec of a driver run.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::{
    HookFuture, LifecycleListener, TestLifecycleAwareListener, forward_after, forward_before,
};
use crate::error::LifecycleError;
use crate::lifecycle::{ResourceSet, Startable, TestCase, TestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    StartFailed,
}

/// Starts its resources on the first spec of a run and keeps them running
/// until [`LifecycleListener::after_run`].
///
/// Unlike the per-spec and per-test listeners this one is stateful: a failed
/// start is retried by the next spec, and `after_run` stops only resources
/// whose start was attempted.
#[derive(Debug)]
pub struct PerRunListener {
    resources: ResourceSet,
    observers: Vec<TestLifecycleAwareListener>,
    state: Mutex<RunState>,
}

impl PerRunListener {
    /// Create a listener owning `startables` in the order supplied.
    #[must_use]
    pub fn new(startables: Vec<Arc<dyn Startable>>) -> Self {
        let resources = ResourceSet::new(startables);
        let observers = resources
            .owned()
            .iter()
            .cloned()
            .map(TestLifecycleAwareListener::new)
            .collect();

        Self {
            resources,
            observers,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Returns the owned resources.
    #[must_use]
    pub const fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    /// Returns whether the resources are currently running.
    pub async fn is_running(&self) -> bool {
        *self.state.lock().await == RunState::Running
    }

    async fn ensure_started(&self, spec: &str) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        if *state == RunState::Running {
            return Ok(());
        }

        info!(spec, resources = self.resources.len(), "starting run resources");
        match self.resources.start_all().await {
            Ok(()) => {
                *state = RunState::Running;
                Ok(())
            }
            Err(error) => {
                *state = RunState::StartFailed;
                Err(error)
            }
        }
    }

    async fn shutdown(&self) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        if *state == RunState::Idle {
            return Ok(());
        }

        info!(resources = self.resources.len(), "stopping run resources");
        *state = RunState::Idle;
        self.resources.stop_all().await
    }

    async fn observe_before(&self, test_case: &TestCase) -> Result<(), LifecycleError> {
        let mut failures = Vec::new();
        forward_before(&self.observers, test_case, &mut failures).await;
        LifecycleError::from_failures(failures)
    }

    async fn observe_after(
        &self,
        test_case: &TestCase,
        result: &TestResult,
    ) -> Result<(), LifecycleError> {
        let mut failures = Vec::new();
        forward_after(&self.observers, test_case, result, &mut failures).await;
        LifecycleError::from_failures(failures)
    }
}

impl LifecycleListener for PerRunListener {
    fn before_spec<'a>(&'a self, spec: &'a str) -> HookFuture<'a> {
        Box::pin(self.ensure_started(spec))
    }

    fn before_test<'a>(&'a self, test_case: &'a TestCase) -> HookFuture<'a> {
        Box::pin(self.observe_before(test_case))
    }

    fn after_test<'a>(&'a self, test_case: &'a TestCase, result: &'a TestResult) -> HookFuture<'a> {
        Box::pin(self.observe_after(test_case, result))
    }

    fn after_run(&self) -> HookFuture<'_> {
        Box::pin(self.shutdown())
    }
}
