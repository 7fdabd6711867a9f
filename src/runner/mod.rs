//! A small sequential driver that exercises listeners the way a test
//! framework would.
//!
//! [`SpecRunner`] runs each [`Spec`] through every registered
//! [`LifecycleListener`]:
//!
//! 1. `before_spec` on each listener in registration order, stopping at the
//!    first failure. A setup failure fails every test without running its
//!    body.
//! 2. For each test, `before_test` on every listener in registration order.
//!    Any failure fails the test and skips its body.
//! 3. The test body on Tokio's blocking pool. A panic fails the test.
//! 4. `after_test` on every listener in reverse order, always.
//! 5. `after_spec` on every listener in reverse order, always.
//!
//! [`SpecRunner::finish`] delivers `after_run` once every spec is done.

mod report;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

pub use report::{SpecReport, TestReport};

use crate::error::LifecycleError;
use crate::lifecycle::{TestCase, TestFailure, TestResult};
use crate::listener::LifecycleListener;

/// A test body. Returning `Err` or panicking fails the test.
pub type TestBody = Arc<dyn Fn() -> Result<(), TestFailure> + Send + Sync>;

/// One named test inside a [`Spec`].
#[derive(Clone)]
pub struct TestDefinition {
    name: String,
    parents: Vec<String>,
    body: TestBody,
}

impl TestDefinition {
    /// Define a top-level test.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Result<(), TestFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parents: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Nest the test inside named containers, outermost first.
    #[must_use]
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// Returns the leaf test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn test_case(&self, spec: &str) -> TestCase {
        TestCase::new(spec, self.name.as_str()).with_parents(self.parents.clone())
    }
}

impl fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("name", &self.name)
            .field("parents", &self.parents)
            .finish_non_exhaustive()
    }
}

/// A named, ordered group of tests sharing per-spec resources.
#[derive(Debug, Clone)]
pub struct Spec {
    name: String,
    tests: Vec<TestDefinition>,
}

impl Spec {
    /// Create an empty spec with a fully qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Append a test body under `name`.
    #[must_use]
    pub fn test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Result<(), TestFailure> + Send + Sync + 'static,
    {
        self.with_test(TestDefinition::new(name, body))
    }

    /// Append a prepared test definition.
    #[must_use]
    pub fn with_test(mut self, test: TestDefinition) -> Self {
        self.tests.push(test);
        self
    }

    /// Returns the spec name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tests in execution order.
    #[must_use]
    pub fn tests(&self) -> &[TestDefinition] {
        &self.tests
    }
}

/// Sequential driver over a fixed list of listeners.
#[derive(Default, Clone)]
pub struct SpecRunner {
    listeners: Vec<Arc<dyn LifecycleListener>>,
}

impl SpecRunner {
    /// Create a runner with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Setup hooks run in registration order.
    #[must_use]
    pub fn with_listener<L: LifecycleListener + 'static>(mut self, listener: Arc<L>) -> Self {
        let registered: Arc<dyn LifecycleListener> = listener;
        self.listeners.push(registered);
        self
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub const fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run every test of `spec` and report the outcome.
    pub async fn run(&self, spec: &Spec) -> SpecReport {
        info!(spec = spec.name(), tests = spec.tests().len(), "running spec");
        let mut report = SpecReport::new(spec.name());

        if let Err(error) = self.setup_spec(spec.name()).await {
            let failure = TestFailure::from_error(error);
            for test in spec.tests() {
                report.push_test(TestReport::new(
                    test.test_case(spec.name()),
                    TestResult::Failed(failure.clone()),
                ));
            }
            report.set_setup_failure(failure);
        } else {
            for test in spec.tests() {
                report.push_test(self.run_test(spec.name(), test).await);
            }
        }

        for listener in self.listeners.iter().rev() {
            if let Err(error) = listener.after_spec(spec.name()).await {
                report.push_teardown_failure(error);
            }
        }

        info!(
            spec = spec.name(),
            failed = report.failed_tests().count(),
            passed = report.is_success(),
            "spec finished"
        );
        report
    }

    /// Blocking variant of [`Self::run`].
    ///
    /// Must not be called from inside an async task.
    #[must_use]
    pub fn run_blocking(&self, runtime: &tokio::runtime::Handle, spec: &Spec) -> SpecReport {
        runtime.block_on(self.run(spec))
    }

    /// Deliver `after_run` to every listener in reverse order.
    ///
    /// # Errors
    ///
    /// Returns every listener failure, folded into one error.
    pub async fn finish(&self) -> Result<(), LifecycleError> {
        let mut failures = Vec::new();
        for listener in self.listeners.iter().rev() {
            if let Err(error) = listener.after_run().await {
                failures.push(error);
            }
        }
        LifecycleError::from_failures(failures)
    }

    /// Blocking variant of [`Self::finish`].
    ///
    /// # Errors
    ///
    /// Returns whatever [`Self::finish`] returns.
    pub fn finish_blocking(&self, runtime: &tokio::runtime::Handle) -> Result<(), LifecycleError> {
        runtime.block_on(self.finish())
    }

    async fn setup_spec(&self, spec: &str) -> Result<(), LifecycleError> {
        for listener in &self.listeners {
            listener.before_spec(spec).await?;
        }
        Ok(())
    }

    async fn run_test(&self, spec: &str, test: &TestDefinition) -> TestReport {
        let test_case = test.test_case(spec);

        let mut setup_failures = Vec::new();
        for listener in &self.listeners {
            if let Err(error) = listener.before_test(&test_case).await {
                setup_failures.push(error);
            }
        }

        let result = match LifecycleError::from_failures(setup_failures) {
            Ok(()) => run_body(Arc::clone(&test.body)).await,
            Err(error) => TestResult::Failed(TestFailure::from_error(error)),
        };
        debug!(
            spec,
            test = test.name(),
            passed = result.is_success(),
            "test finished"
        );

        let mut report = TestReport::new(test_case, result);
        for listener in self.listeners.iter().rev() {
            if let Err(error) = listener.after_test(report.test_case(), report.result()).await {
                report.push_teardown_failure(error);
            }
        }
        report
    }
}

impl fmt::Debug for SpecRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecRunner")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

async fn run_body(body: TestBody) -> TestResult {
    match tokio::task::spawn_blocking(move || body()).await {
        Ok(outcome) => TestResult::from(outcome),
        Err(error) if error.is_panic() => TestResult::Failed(TestFailure::new(format!(
            "test panicked: {}",
            panic_message(error.into_panic())
        ))),
        Err(error) => TestResult::Failed(TestFailure::new(format!(
            "test was interrupted: {error}"
        ))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(other) => other.downcast_ref::<&str>().map_or_else(
            || String::from("non-string panic payload"),
            |message| String::from(*message),
        ),
    }
}
