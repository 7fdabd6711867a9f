//! Shared behavioural-test state for resource lifecycle scenarios.

use std::sync::{Arc, Mutex};

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Step result type for lifecycle BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Ordered record of everything the fake database and test bodies did.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Listener the database is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One start and stop around the whole spec.
    PerSpec,
    /// One start and stop around every test.
    PerTest,
}

/// What the scenario observed after running the spec.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Number of tests that did not pass.
    pub failed_tests: usize,
    /// Number of tests recorded in the report.
    pub total_tests: usize,
}

/// Shared scenario state for lifecycle behavioural tests.
#[derive(Default, ScenarioState)]
pub struct LifecycleState {
    /// Listener the database is bound to.
    pub(crate) scope: Slot<Scope>,

    /// Whether the database implements the per-test observation facet.
    pub(crate) observes_tests: Slot<bool>,

    /// Whether the database refuses to start.
    pub(crate) fails_to_start: Slot<bool>,

    /// Whether the final test body returns a failure.
    pub(crate) last_test_fails: Slot<bool>,

    /// Journal shared by the database and the test bodies.
    pub(crate) journal: Slot<Journal>,

    /// Outcome of the most recent spec run.
    pub(crate) outcome: Slot<RunOutcome>,
}

/// Fixture providing fresh state for each lifecycle scenario.
#[fixture]
pub fn lifecycle_state() -> LifecycleState {
    let state = LifecycleState::default();
    state.scope.set(Scope::PerSpec);
    state.observes_tests.set(false);
    state.fails_to_start.set(false);
    state.last_test_fails.set(false);
    state.journal.set(Arc::new(Mutex::new(Vec::new())));
    state
}
