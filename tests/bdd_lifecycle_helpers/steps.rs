//! Given/when step definitions for resource lifecycle scenarios.

use std::sync::Arc;

use rstest_bdd_macros::{given, when};
use testscope::error::ResourceFailure;
use testscope::lifecycle::{Startable, TestDescription, TestFailure, TestLifecycleAware};
use testscope::listener::{PerSpecListener, PerTestListener};
use testscope::runner::{Spec, SpecRunner};

use super::state::{Journal, LifecycleState, RunOutcome, Scope, StepResult};

const SPEC_NAME: &str = "app.UserSpec";

/// Fake database that writes every lifecycle call to the journal.
struct Database {
    journal: Journal,
    observes_tests: bool,
    fails_to_start: bool,
}

impl Database {
    fn record(&self, entry: String) {
        if let Ok(mut entries) = self.journal.lock() {
            entries.push(entry);
        }
    }
}

impl Startable for Database {
    fn name(&self) -> String {
        String::from("db")
    }

    fn start(&self) -> Result<(), ResourceFailure> {
        self.record(String::from("start"));
        if self.fails_to_start {
            return Err(Box::from("port already in use"));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), ResourceFailure> {
        self.record(String::from("stop"));
        Ok(())
    }

    fn lifecycle_aware(self: Arc<Self>) -> Option<Arc<dyn TestLifecycleAware>> {
        if !self.observes_tests {
            return None;
        }
        Some(self)
    }
}

impl TestLifecycleAware for Database {
    fn before_test(&self, description: &TestDescription) -> Result<(), ResourceFailure> {
        self.record(format!("observe:{}", description.test_id()));
        Ok(())
    }

    fn after_test(
        &self,
        description: &TestDescription,
        failure: Option<&TestFailure>,
    ) -> Result<(), ResourceFailure> {
        self.record(format!(
            "finished:{}:failed={}",
            description.test_id(),
            failure.is_some()
        ));
        Ok(())
    }
}

#[given("a database bound to each spec")]
fn database_bound_to_each_spec(lifecycle_state: &LifecycleState) {
    lifecycle_state.scope.set(Scope::PerSpec);
}

#[given("a database bound to each test")]
fn database_bound_to_each_test(lifecycle_state: &LifecycleState) {
    lifecycle_state.scope.set(Scope::PerTest);
}

#[given("the database observes test boundaries")]
fn database_observes_test_boundaries(lifecycle_state: &LifecycleState) {
    lifecycle_state.observes_tests.set(true);
}

#[given("the database fails to start")]
fn database_fails_to_start(lifecycle_state: &LifecycleState) {
    lifecycle_state.fails_to_start.set(true);
}

#[given("the last test fails")]
fn last_test_fails(lifecycle_state: &LifecycleState) {
    lifecycle_state.last_test_fails.set(true);
}

#[when("a spec with {count} tests runs")]
fn spec_with_tests_runs(lifecycle_state: &LifecycleState, count: usize) -> StepResult<()> {
    let journal = lifecycle_state
        .journal
        .get()
        .ok_or_else(|| String::from("journal should be initialised"))?;
    let database = Arc::new(Database {
        journal: Arc::clone(&journal),
        observes_tests: lifecycle_state.observes_tests.get().unwrap_or(false),
        fails_to_start: lifecycle_state.fails_to_start.get().unwrap_or(false),
    });
    let startable: Arc<dyn Startable> = database;
    let runner = match lifecycle_state.scope.get().unwrap_or(Scope::PerSpec) {
        Scope::PerSpec => {
            SpecRunner::new().with_listener(Arc::new(PerSpecListener::new(vec![startable])))
        }
        Scope::PerTest => {
            SpecRunner::new().with_listener(Arc::new(PerTestListener::new(vec![startable])))
        }
    };

    let last_fails = lifecycle_state.last_test_fails.get().unwrap_or(false);
    let spec = (1..=count).fold(Spec::new(SPEC_NAME), |spec, index| {
        let body_journal = Arc::clone(&journal);
        let fails = last_fails && index == count;
        spec.test(format!("test {index}"), move || {
            if let Ok(mut entries) = body_journal.lock() {
                entries.push(format!("body:{index}"));
            }
            if fails {
                return Err(TestFailure::new("assertion failed"));
            }
            Ok(())
        })
    });

    let runtime = tokio::runtime::Runtime::new().map_err(|error| error.to_string())?;
    let report = runner.run_blocking(runtime.handle(), &spec);
    lifecycle_state.outcome.set(RunOutcome {
        failed_tests: report.failed_tests().count(),
        total_tests: report.tests().len(),
    });
    Ok(())
}
