//! Then-step assertions for resource lifecycle scenarios.

use rstest_bdd_macros::then;

use super::state::{LifecycleState, RunOutcome, StepResult};

fn journal_entries(lifecycle_state: &LifecycleState) -> StepResult<Vec<String>> {
    let journal = lifecycle_state
        .journal
        .get()
        .ok_or_else(|| String::from("journal should be initialised"))?;
    let entries = journal
        .lock()
        .map_err(|_| String::from("journal lock should not be poisoned"))?;
    Ok(entries.clone())
}

fn run_outcome(lifecycle_state: &LifecycleState) -> StepResult<RunOutcome> {
    lifecycle_state
        .outcome
        .get()
        .ok_or_else(|| String::from("spec should have run"))
}

fn count_entries(lifecycle_state: &LifecycleState, entry: &str) -> StepResult<usize> {
    Ok(journal_entries(lifecycle_state)?
        .iter()
        .filter(|recorded| recorded.as_str() == entry)
        .count())
}

fn expect_count(
    lifecycle_state: &LifecycleState,
    entry: &str,
    expected: usize,
) -> StepResult<()> {
    let actual = count_entries(lifecycle_state, entry)?;
    if actual == expected {
        return Ok(());
    }
    Err(format!("expected {expected} {entry} calls, got {actual}"))
}

#[then("the database was started once")]
fn database_was_started_once(lifecycle_state: &LifecycleState) -> StepResult<()> {
    expect_count(lifecycle_state, "start", 1)
}

#[then("the database was started {count} times")]
fn database_was_started(lifecycle_state: &LifecycleState, count: usize) -> StepResult<()> {
    expect_count(lifecycle_state, "start", count)
}

#[then("the database was stopped once")]
fn database_was_stopped_once(lifecycle_state: &LifecycleState) -> StepResult<()> {
    expect_count(lifecycle_state, "stop", 1)
}

#[then("the database was stopped {count} times")]
fn database_was_stopped(lifecycle_state: &LifecycleState, count: usize) -> StepResult<()> {
    expect_count(lifecycle_state, "stop", count)
}

#[then("the database observed test {test_id}")]
fn database_observed_test(lifecycle_state: &LifecycleState, test_id: String) -> StepResult<()> {
    let entries = journal_entries(lifecycle_state)?;
    let expected = format!("observe:{test_id}");
    if entries.contains(&expected) {
        return Ok(());
    }
    Err(format!("expected {expected} in journal {entries:?}"))
}

fn expect_failed_tests(lifecycle_state: &LifecycleState, expected: usize) -> StepResult<()> {
    let outcome = run_outcome(lifecycle_state)?;
    if outcome.failed_tests == expected {
        return Ok(());
    }
    Err(format!(
        "expected {expected} of {} tests to fail, got {}",
        outcome.total_tests, outcome.failed_tests
    ))
}

#[then("every test passed")]
fn every_test_passed(lifecycle_state: &LifecycleState) -> StepResult<()> {
    expect_failed_tests(lifecycle_state, 0)
}

#[then("exactly one test failed")]
fn exactly_one_test_failed(lifecycle_state: &LifecycleState) -> StepResult<()> {
    expect_failed_tests(lifecycle_state, 1)
}

#[then("every test failed")]
fn every_test_failed(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let total = run_outcome(lifecycle_state)?.total_tests;
    if total == 0 {
        return Err(String::from("expected the spec to contain tests"));
    }
    expect_failed_tests(lifecycle_state, total)
}

#[then("no test body ran")]
fn no_test_body_ran(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let entries = journal_entries(lifecycle_state)?;
    if entries.iter().any(|entry| entry.starts_with("body:")) {
        return Err(format!("expected no bodies to run, journal was {entries:?}"));
    }
    Ok(())
}
