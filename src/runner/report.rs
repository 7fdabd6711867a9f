//! Outcomes collected while running a spec.

use eyre::{Report, eyre};

use crate::error::LifecycleError;
use crate::lifecycle::{TestCase, TestDescription, TestFailure, TestResult};

/// Outcome of one test, including teardown failures reported after it.
#[derive(Debug)]
pub struct TestReport {
    test_case: TestCase,
    result: TestResult,
    teardown_failures: Vec<LifecycleError>,
}

impl TestReport {
    pub(super) const fn new(test_case: TestCase, result: TestResult) -> Self {
        Self {
            test_case,
            result,
            teardown_failures: Vec::new(),
        }
    }

    pub(super) fn push_teardown_failure(&mut self, error: LifecycleError) {
        self.teardown_failures.push(error);
    }

    /// Returns the test that ran.
    #[must_use]
    pub const fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    /// Returns the test's own result, setup failures included.
    #[must_use]
    pub const fn result(&self) -> &TestResult {
        &self.result
    }

    /// Returns `after_test` failures raised once the test had finished.
    #[must_use]
    pub fn teardown_failures(&self) -> &[LifecycleError] {
        &self.teardown_failures
    }

    /// Returns the `<spec>/<test name>` identifier.
    #[must_use]
    pub fn test_id(&self) -> String {
        String::from(TestDescription::from_test_case(&self.test_case).test_id())
    }

    /// Returns whether the test passed and tore down cleanly.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_success() && self.teardown_failures.is_empty()
    }
}

/// Outcome of a whole spec.
#[derive(Debug)]
pub struct SpecReport {
    spec: String,
    setup_failure: Option<TestFailure>,
    tests: Vec<TestReport>,
    teardown_failures: Vec<LifecycleError>,
}

impl SpecReport {
    pub(super) fn new(spec: &str) -> Self {
        Self {
            spec: String::from(spec),
            setup_failure: None,
            tests: Vec::new(),
            teardown_failures: Vec::new(),
        }
    }

    pub(super) fn set_setup_failure(&mut self, failure: TestFailure) {
        self.setup_failure = Some(failure);
    }

    pub(super) fn push_test(&mut self, test: TestReport) {
        self.tests.push(test);
    }

    pub(super) fn push_teardown_failure(&mut self, error: LifecycleError) {
        self.teardown_failures.push(error);
    }

    /// Returns the spec name.
    #[must_use]
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Returns the `before_spec` failure that prevented every test from
    /// running.
    #[must_use]
    pub const fn setup_failure(&self) -> Option<&TestFailure> {
        self.setup_failure.as_ref()
    }

    /// Returns per-test reports in execution order.
    #[must_use]
    pub fn tests(&self) -> &[TestReport] {
        &self.tests
    }

    /// Returns `after_spec` failures.
    #[must_use]
    pub fn teardown_failures(&self) -> &[LifecycleError] {
        &self.teardown_failures
    }

    /// Iterate over tests that did not pass or did not tear down cleanly.
    #[must_use]
    pub fn failed_tests(&self) -> impl Iterator<Item = &TestReport> {
        self.tests.iter().filter(|test| !test.is_success())
    }

    /// Returns whether every test passed and every hook succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.setup_failure.is_none()
            && self.teardown_failures.is_empty()
            && self.tests.iter().all(TestReport::is_success)
    }

    /// Convert the report into an application-level result.
    ///
    /// # Errors
    ///
    /// Returns a report naming every failed test and teardown failure.
    pub fn into_report(self) -> Result<(), Report> {
        if self.is_success() {
            return Ok(());
        }

        let mut lines = Vec::new();
        if let Some(failure) = &self.setup_failure {
            lines.push(format!("setup: {failure}"));
        }
        for test in self.failed_tests() {
            if let Some(failure) = test.result().failure() {
                lines.push(format!("{}: {failure}", test.test_id()));
            }
            for error in test.teardown_failures() {
                lines.push(format!("{} teardown: {error}", test.test_id()));
            }
        }
        for error in &self.teardown_failures {
            lines.push(format!("teardown: {error}"));
        }

        Err(eyre!("spec '{}' failed:\n  {}", self.spec, lines.join("\n  ")))
    }
}
