//! Resource contracts and the building blocks listeners are made from.
//!
//! A [`Startable`] is any externally managed resource with explicit start and
//! stop operations. A startable may additionally expose the
//! [`TestLifecycleAware`] facet to observe individual test boundaries; the
//! facet is discovered once, when the resource is wrapped in a
//! [`ResourceHandle`].
//!
//! Both contracts are blocking. Callers inside this crate never invoke them
//! on the async scheduling thread: every call is moved onto Tokio's blocking
//! pool and awaited, so a hook returns only once the resource has finished.

mod description;
mod offload;
mod resource_set;
mod test_case;

use std::fmt;
use std::sync::Arc;

pub use description::{TestDescription, filesystem_friendly};
pub(crate) use offload::run_blocking;
pub use resource_set::ResourceSet;
pub use test_case::{TestCase, TestFailure, TestResult};

use crate::error::{LifecycleError, ResourceFailure};

/// An externally managed resource with an explicit start/stop lifecycle.
///
/// Implementations should treat both operations as idempotent in intent: a
/// listener may issue `stop` for a resource whose `start` failed or never
/// ran.
pub trait Startable: Send + Sync {
    /// Human-readable name used for logging and failure attribution.
    fn name(&self) -> String {
        String::from(std::any::type_name::<Self>())
    }

    /// Bring the resource into a ready state.
    ///
    /// # Errors
    ///
    /// Returns the resource's own failure when it cannot become ready.
    fn start(&self) -> Result<(), ResourceFailure>;

    /// Tear the resource down.
    ///
    /// # Errors
    ///
    /// Returns the resource's own failure when teardown does not complete.
    fn stop(&self) -> Result<(), ResourceFailure>;

    /// Resources that must be running before this one starts.
    fn dependencies(&self) -> Vec<Arc<dyn Startable>> {
        Vec::new()
    }

    /// Capability query for the per-test observation facet.
    ///
    /// Resources that also implement [`TestLifecycleAware`] override this to
    /// return `Some(self)`.
    fn lifecycle_aware(self: Arc<Self>) -> Option<Arc<dyn TestLifecycleAware>> {
        None
    }
}

/// Optional facet for resources that observe individual test boundaries.
pub trait TestLifecycleAware: Send + Sync {
    /// Called before a test body runs.
    ///
    /// # Errors
    ///
    /// Returns the observer's failure; the paired start is still attempted.
    fn before_test(&self, description: &TestDescription) -> Result<(), ResourceFailure> {
        let _ = description;
        Ok(())
    }

    /// Called after a test body finished, with its failure if it had one.
    ///
    /// # Errors
    ///
    /// Returns the observer's failure; the paired stop is still attempted.
    fn after_test(
        &self,
        description: &TestDescription,
        failure: Option<&TestFailure>,
    ) -> Result<(), ResourceFailure> {
        let _ = (description, failure);
        Ok(())
    }
}

/// A startable together with its cached capability query.
#[derive(Clone)]
pub struct ResourceHandle {
    name: String,
    startable: Arc<dyn Startable>,
    lifecycle_aware: Option<Arc<dyn TestLifecycleAware>>,
}

impl ResourceHandle {
    /// Wrap a startable, querying the [`TestLifecycleAware`] facet once.
    #[must_use]
    pub fn new(startable: Arc<dyn Startable>) -> Self {
        let lifecycle_aware = Arc::clone(&startable).lifecycle_aware();
        Self {
            name: startable.name(),
            startable,
            lifecycle_aware,
        }
    }

    /// Wrap a concrete resource.
    #[must_use]
    pub fn from_resource<S: Startable + 'static>(resource: Arc<S>) -> Self {
        Self::new(resource)
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wrapped startable.
    #[must_use]
    pub const fn startable(&self) -> &Arc<dyn Startable> {
        &self.startable
    }

    /// Returns the observation facet when the resource exposes one.
    #[must_use]
    pub fn lifecycle_aware(&self) -> Option<&Arc<dyn TestLifecycleAware>> {
        self.lifecycle_aware.as_ref()
    }

    /// Returns whether the resource observes per-test hooks.
    #[must_use]
    pub const fn is_lifecycle_aware(&self) -> bool {
        self.lifecycle_aware.is_some()
    }

    /// Start the resource on the blocking pool and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::StartFailed` when the resource reports a
    /// failure, or `LifecycleError::Interrupted` when the blocking task
    /// panicked.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        let startable = Arc::clone(&self.startable);
        run_blocking("start", &self.name, move || startable.start())
            .await?
            .map_err(|source| LifecycleError::StartFailed {
                resource: self.name.clone(),
                source,
            })
    }

    /// Stop the resource on the blocking pool and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::StopFailed` when the resource reports a
    /// failure, or `LifecycleError::Interrupted` when the blocking task
    /// panicked.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let startable = Arc::clone(&self.startable);
        run_blocking("stop", &self.name, move || startable.stop())
            .await?
            .map_err(|source| LifecycleError::StopFailed {
                resource: self.name.clone(),
                source,
            })
    }

    /// Returns the data address of the wrapped startable, used to detect the
    /// same resource reached through several dependency paths.
    pub(crate) fn identity(&self) -> *const () {
        Arc::as_ptr(&self.startable).cast::<()>()
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("name", &self.name)
            .field("lifecycle_aware", &self.is_lifecycle_aware())
            .finish_non_exhaustive()
    }
}
