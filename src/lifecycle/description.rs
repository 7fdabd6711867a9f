//! Stable identifiers and filesystem-safe names for running tests.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::TestCase;

/// Bytes that survive encoding unchanged: ASCII alphanumerics plus the
/// unreserved punctuation `-`, `_`, `.` and `~`.
const FILENAME_UNSAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Stand-in used when a test has an empty name.
const EMPTY_NAME_PLACEHOLDER: &str = "_";

/// Separator between the spec name and the test name in a test identifier.
const TEST_ID_SEPARATOR: char = '/';

/// Immutable description of one test invocation, built when a hook fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescription {
    test_id: String,
    display_name: String,
    name_parts: Vec<String>,
    filesystem_friendly_name: String,
}

impl TestDescription {
    /// Derive a description from a spec name and a raw test name.
    #[must_use]
    pub fn new(spec: &str, test_name: &str) -> Self {
        Self {
            test_id: format!("{spec}{TEST_ID_SEPARATOR}{test_name}"),
            display_name: String::from(test_name),
            name_parts: vec![String::from(simple_name(spec)), String::from(test_name)],
            filesystem_friendly_name: filesystem_friendly(test_name),
        }
    }

    /// Derive a description for a driver-supplied test case.
    #[must_use]
    pub fn from_test_case(test_case: &TestCase) -> Self {
        Self::new(test_case.spec(), &test_case.qualified_name())
    }

    /// Returns `<spec>/<raw test name>`.
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Returns the raw test name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the spec's simple name followed by the test name.
    #[must_use]
    pub fn name_parts(&self) -> &[String] {
        &self.name_parts
    }

    /// Returns the percent-encoded test name, safe as a file or directory
    /// name.
    #[must_use]
    pub fn filesystem_friendly_name(&self) -> &str {
        &self.filesystem_friendly_name
    }
}

/// Percent-encode every byte of `name` that is unsafe in a file name.
///
/// Names made only of dots are encoded entirely so they can never resolve to
/// `.` or `..`. An empty name becomes `_`.
#[must_use]
pub fn filesystem_friendly(name: &str) -> String {
    if name.is_empty() {
        return String::from(EMPTY_NAME_PLACEHOLDER);
    }

    if name.bytes().all(|byte| byte == b'.') {
        return "%2E".repeat(name.len());
    }

    utf8_percent_encode(name, FILENAME_UNSAFE).to_string()
}

fn simple_name(spec: &str) -> &str {
    spec.rsplit(['.', ':']).next().unwrap_or(spec)
}
