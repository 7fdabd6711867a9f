//! Moves blocking lifecycle calls off the async scheduling thread.

use crate::error::{LifecycleError, ResourceFailure};

/// Run a blocking resource call on Tokio's blocking pool and wait for it.
///
/// The outer `Result` reports whether the task completed at all; the inner
/// one is the resource's own outcome.
pub(crate) async fn run_blocking<F>(
    operation: &str,
    resource: &str,
    call: F,
) -> Result<Result<(), ResourceFailure>, LifecycleError>
where
    F: FnOnce() -> Result<(), ResourceFailure> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|error| LifecycleError::Interrupted {
            operation: String::from(operation),
            resource: String::from(resource),
            message: error.to_string(),
        })
}
