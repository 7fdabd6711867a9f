//! Per-test hook forwarding for a single resource.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{HookFuture, LifecycleListener};
use crate::error::{HookKind, LifecycleError, ResourceFailure};
use crate::lifecycle::{
    ResourceHandle, Startable, TestCase, TestDescription, TestResult, run_blocking,
};

/// Bridges one resource to per-test hooks, whether or not it exposes the
/// [`TestLifecycleAware`](crate::lifecycle::TestLifecycleAware) facet.
///
/// Resources without the facet are fully supported; hook calls are skipped.
#[derive(Debug, Clone)]
pub struct TestLifecycleAwareListener {
    resource: ResourceHandle,
}

impl TestLifecycleAwareListener {
    /// Wrap an already-queried resource handle.
    #[must_use]
    pub const fn new(resource: ResourceHandle) -> Self {
        Self { resource }
    }

    /// Wrap a startable, querying its facet once.
    #[must_use]
    pub fn for_startable(startable: Arc<dyn Startable>) -> Self {
        Self::new(ResourceHandle::new(startable))
    }

    /// Returns the observed resource.
    #[must_use]
    pub const fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// Deliver the pre-test hook.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::HookFailed` when the resource's hook fails.
    pub async fn deliver_before(&self, test_case: &TestCase) -> Result<(), LifecycleError> {
        let Some(facet) = self.resource.lifecycle_aware() else {
            trace!(resource = self.resource.name(), "resource does not observe tests");
            return Ok(());
        };

        let aware = Arc::clone(facet);
        let description = TestDescription::from_test_case(test_case);
        debug!(
            resource = self.resource.name(),
            test_id = description.test_id(),
            "delivering before_test hook"
        );
        let test_id = String::from(description.test_id());
        let outcome = run_blocking("before_test", self.resource.name(), move || {
            aware.before_test(&description)
        })
        .await?;
        self.hook_outcome(HookKind::BeforeTest, test_id, outcome)
    }

    /// Deliver the post-test hook with the test's failure, if it had one.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::HookFailed` when the resource's hook fails.
    pub async fn deliver_after(
        &self,
        test_case: &TestCase,
        result: &TestResult,
    ) -> Result<(), LifecycleError> {
        let Some(facet) = self.resource.lifecycle_aware() else {
            trace!(resource = self.resource.name(), "resource does not observe tests");
            return Ok(());
        };

        let aware = Arc::clone(facet);
        let description = TestDescription::from_test_case(test_case);
        let failure = result.failure().cloned();
        debug!(
            resource = self.resource.name(),
            test_id = description.test_id(),
            failed = failure.is_some(),
            "delivering after_test hook"
        );
        let test_id = String::from(description.test_id());
        let outcome = run_blocking("after_test", self.resource.name(), move || {
            aware.after_test(&description, failure.as_ref())
        })
        .await?;
        self.hook_outcome(HookKind::AfterTest, test_id, outcome)
    }

    fn hook_outcome(
        &self,
        hook: HookKind,
        test_id: String,
        outcome: Result<(), ResourceFailure>,
    ) -> Result<(), LifecycleError> {
        outcome.map_err(|source| {
            warn!(
                resource = self.resource.name(),
                %hook,
                test_id = %test_id,
                error = %source,
                "test lifecycle hook failed"
            );
            LifecycleError::HookFailed {
                resource: String::from(self.resource.name()),
                hook,
                test_id,
                source,
            }
        })
    }
}

impl LifecycleListener for TestLifecycleAwareListener {
    fn before_test<'a>(&'a self, test_case: &'a TestCase) -> HookFuture<'a> {
        Box::pin(self.deliver_before(test_case))
    }

    fn after_test<'a>(&'a self, test_case: &'a TestCase, result: &'a TestResult) -> HookFuture<'a> {
        Box::pin(self.deliver_after(test_case, result))
    }
}
