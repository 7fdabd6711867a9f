//! Listeners that bind resource lifecycles to spec and test boundaries.
//!
//! A test driver registers listeners and calls their hooks at the matching
//! points of its own execution. Each listener decides how those hooks map onto
//! its resources:
//!
//! - [`PerTestListener`]: fresh start and stop around every test case.
//! - [`PerSpecListener`]: one start and one stop around a whole spec.
//! - [`PerRunListener`]: started on the first spec of a run, stopped when the
//!   run ends.
//! - [`TestLifecycleAwareListener`]: forwards per-test hooks to a resource
//!   whose lifecycle is managed elsewhere.
//!
//! Every hook returns only once the underlying blocking work has completed.
//! The `*_blocking` variants let synchronous drivers call the same hooks
//! through a Tokio runtime handle.

mod aware;
mod per_run;
mod per_spec;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use aware::TestLifecycleAwareListener;
pub use per_run::PerRunListener;
pub use per_spec::PerSpecListener;
pub use per_test::PerTestListener;

use crate::error::LifecycleError;
use crate::lifecycle::{Startable, TestCase, TestResult};

/// Boxed future type returned by [`LifecycleListener`] hooks.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), LifecycleError>> + Send + 'a>>;

/// Spec-level and test-level callbacks a driver invokes.
///
/// Every hook defaults to an immediately successful no-op so listeners only
/// implement the boundaries they care about.
pub trait LifecycleListener: Send + Sync {
    /// Called once before any test of `spec` runs.
    fn before_spec<'a>(&'a self, spec: &'a str) -> HookFuture<'a> {
        let _ = spec;
        completed()
    }

    /// Called once after every test of `spec` has finished.
    fn after_spec<'a>(&'a self, spec: &'a str) -> HookFuture<'a> {
        let _ = spec;
        completed()
    }

    /// Called before each test body runs.
    fn before_test<'a>(&'a self, test_case: &'a TestCase) -> HookFuture<'a> {
        let _ = test_case;
        completed()
    }

    /// Called after each test body, with its outcome.
    fn after_test<'a>(&'a self, test_case: &'a TestCase, result: &'a TestResult) -> HookFuture<'a> {
        let _ = (test_case, result);
        completed()
    }

    /// Called once when the driver has finished every spec of the run.
    fn after_run(&self) -> HookFuture<'_> {
        completed()
    }

    /// Blocking variant of [`Self::before_spec`].
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::before_spec`] returns.
    fn before_spec_blocking(
        &self,
        runtime: &tokio::runtime::Handle,
        spec: &str,
    ) -> Result<(), LifecycleError> {
        runtime.block_on(self.before_spec(spec))
    }

    /// Blocking variant of [`Self::after_spec`].
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::after_spec`] returns.
    fn after_spec_blocking(
        &self,
        runtime: &tokio::runtime::Handle,
        spec: &str,
    ) -> Result<(), LifecycleError> {
        runtime.block_on(self.after_spec(spec))
    }

    /// Blocking variant of [`Self::before_test`].
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::before_test`] returns.
    fn before_test_blocking(
        &self,
        runtime: &tokio::runtime::Handle,
        test_case: &TestCase,
    ) -> Result<(), LifecycleError> {
        runtime.block_on(self.before_test(test_case))
    }

    /// Blocking variant of [`Self::after_test`].
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::after_test`] returns.
    fn after_test_blocking(
        &self,
        runtime: &tokio::runtime::Handle,
        test_case: &TestCase,
        result: &TestResult,
    ) -> Result<(), LifecycleError> {
        runtime.block_on(self.after_test(test_case, result))
    }

    /// Blocking variant of [`Self::after_run`].
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::after_run`] returns.
    fn after_run_blocking(&self, runtime: &tokio::runtime::Handle) -> Result<(), LifecycleError> {
        runtime.block_on(self.after_run())
    }
}

/// Where per-test hooks sit relative to a per-test resource's start.
///
/// Hooks always fire against the resource in the state it is in at call
/// time. The post-test hook precedes `stop` in both orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookOrder {
    /// Deliver the pre-test hook, then start the resources.
    #[default]
    HookFirst,
    /// Start the resources, then deliver the pre-test hook.
    ResourceFirst,
}

impl HookOrder {
    /// Parse the kebab-case name used in configuration.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "hook-first" => Some(Self::HookFirst),
            "resource-first" => Some(Self::ResourceFirst),
            _ => None,
        }
    }
}

/// Wrap one resource in a listener that restarts it for every test.
///
/// Per-test hooks are forwarded automatically when the resource implements
/// [`TestLifecycleAware`](crate::lifecycle::TestLifecycleAware).
#[must_use]
pub fn per_test<S: Startable + 'static>(resource: Arc<S>) -> PerTestListener {
    let startable: Arc<dyn Startable> = resource;
    PerTestListener::new(vec![startable])
}

/// Wrap one resource in a listener that runs it for a whole spec.
///
/// Per-test hooks are forwarded automatically when the resource implements
/// [`TestLifecycleAware`](crate::lifecycle::TestLifecycleAware).
#[must_use]
pub fn per_spec<S: Startable + 'static>(resource: Arc<S>) -> PerSpecListener {
    let startable: Arc<dyn Startable> = resource;
    PerSpecListener::new(vec![startable])
}

fn completed<'a>() -> HookFuture<'a> {
    Box::pin(std::future::ready(Ok(())))
}

/// Deliver the pre-test hook to every observer, collecting failures.
async fn forward_before(
    observers: &[TestLifecycleAwareListener],
    test_case: &TestCase,
    failures: &mut Vec<LifecycleError>,
) {
    for observer in observers {
        if let Err(error) = observer.deliver_before(test_case).await {
            failures.push(error);
        }
    }
}

/// Deliver the post-test hook to every observer, collecting failures.
async fn forward_after(
    observers: &[TestLifecycleAwareListener],
    test_case: &TestCase,
    result: &TestResult,
    failures: &mut Vec<LifecycleError>,
) {
    for observer in observers {
        if let Err(error) = observer.deliver_after(test_case, result).await {
            failures.push(error);
        }
    }
}
