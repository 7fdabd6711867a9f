//! Driver-supplied test metadata and outcomes.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Separator placed between parent container names and the leaf test name.
const NESTED_NAME_SEPARATOR: &str = " -- ";

/// A running test case as the driver describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    spec: String,
    name: String,
    parents: Vec<String>,
}

impl TestCase {
    /// Describe a top-level test inside `spec`.
    #[must_use]
    pub fn new(spec: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            name: name.into(),
            parents: Vec::new(),
        }
    }

    /// Attach the names of the containers this test is nested in, outermost
    /// first.
    #[must_use]
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// Returns the fully qualified name of the containing spec.
    #[must_use]
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Returns the leaf test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the enclosing container names, outermost first.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns the human-readable test name including any parents.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.parents.is_empty() {
            return self.name.clone();
        }

        let mut parts: Vec<&str> = self.parents.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join(NESTED_NAME_SEPARATOR)
    }
}

/// Why a test did not pass.
#[derive(Debug, Clone)]
pub struct TestFailure {
    message: String,
    cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl TestFailure {
    /// Create a failure from a plain message, such as an assertion text.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a failure that carries an underlying error as its cause.
    #[must_use]
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            cause: Some(Arc::new(error)),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for TestFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Outcome of a single test case.
#[derive(Debug, Clone)]
pub enum TestResult {
    /// The test body completed without error.
    Passed,
    /// The test body, or the infrastructure around it, failed.
    Failed(TestFailure),
}

impl TestResult {
    /// Returns the failure carried by this result, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&TestFailure> {
        match self {
            Self::Passed => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Returns whether the test passed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl From<Result<(), TestFailure>> for TestResult {
    fn from(outcome: Result<(), TestFailure>) -> Self {
        match outcome {
            Ok(()) => Self::Passed,
            Err(failure) => Self::Failed(failure),
        }
    }
}
