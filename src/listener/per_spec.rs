//! One start and one stop around a whole spec.

use std::sync::Arc;

use tracing::info;

use super::{
    HookFuture, LifecycleListener, TestLifecycleAwareListener, forward_after, forward_before,
};
use crate::error::LifecycleError;
use crate::lifecycle::{ResourceSet, Startable, TestCase, TestResult};

/// Starts its resources before a spec and stops them after it.
///
/// Every test of the spec observes the same running instances; per-test
/// hooks are still forwarded at each test boundary. The listener keeps no
/// state between hooks, so `after_spec` always issues `stop` even when
/// `before_spec` never ran.
///
/// Resources are shared by every test in the spec. Tests that mutate them
/// must coordinate among themselves.
#[derive(Debug, Clone)]
pub struct PerSpecListener {
    resources: ResourceSet,
    observers: Vec<TestLifecycleAwareListener>,
}

impl PerSpecListener {
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
        }
    }

    /// Returns the owned resources.
    #[must_use]
    pub const fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    async fn start(&self, spec: &str) -> Result<(), LifecycleError> {
        info!(spec, resources = self.resources.len(), "starting spec resources");
        self.resources.start_all().await
    }

    async fn stop(&self, spec: &str) -> Result<(), LifecycleError> {
        info!(spec, resources = self.resources.len(), "stopping spec resources");
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

impl LifecycleListener for PerSpecListener {
    fn before_spec<'a>(&'a self, spec: &'a str) -> HookFuture<'a> {
        Box::pin(self.start(spec))
    }

    fn after_spec<'a>(&'a self, spec: &'a str) -> HookFuture<'a> {
        Box::pin(self.stop(spec))
    }

    fn before_test<'a>(&'a self, test_case: &'a TestCase) -> HookFuture<'a> {
        Box::pin(self.observe_before(test_case))
    }

    fn after_test<'a>(&'a self, test_case: &'a TestCase, result: &'a TestResult) -> HookFuture<'a> {
        Box::pin(self.observe_after(test_case, result))
    }
}
