//! Ordered start and best-effort stop of a group of resources.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{ResourceHandle, Startable};
use crate::error::LifecycleError;

/// The resources a listener owns, in declaration order, plus the start plan
/// derived from their dependencies.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    owned: Vec<ResourceHandle>,
    plan: Vec<ResourceHandle>,
    dependency_only: Vec<ResourceHandle>,
}

impl ResourceSet {
    /// Build a set from startables in the order they were supplied.
    #[must_use]
    pub fn new(startables: Vec<Arc<dyn Startable>>) -> Self {
        Self::from_handles(startables.into_iter().map(ResourceHandle::new).collect())
    }

    /// Build a set from already-wrapped handles.
    ///
    /// A resource supplied more than once is kept at its first position, so
    /// it is started, stopped and observed once per scope.
    #[must_use]
    pub fn from_handles(handles: Vec<ResourceHandle>) -> Self {
        let mut seen = HashSet::new();
        let owned: Vec<ResourceHandle> = handles
            .into_iter()
            .filter(|handle| seen.insert(handle.identity()))
            .collect();
        let plan = start_plan(&owned);
        let owned_ids: HashSet<*const ()> = owned.iter().map(ResourceHandle::identity).collect();
        let dependency_only = plan
            .iter()
            .filter(|handle| !owned_ids.contains(&handle.identity()))
            .cloned()
            .collect();

        Self {
            owned,
            plan,
            dependency_only,
        }
    }

    /// Returns the owned resources in declaration order.
    #[must_use]
    pub fn owned(&self) -> &[ResourceHandle] {
        &self.owned
    }

    /// Returns the order resources are started in, dependencies first.
    #[must_use]
    pub fn start_order(&self) -> &[ResourceHandle] {
        &self.plan
    }

    /// Returns the number of owned resources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.owned.len()
    }

    /// Returns whether the set owns no resources.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Start every resource in plan order, one at a time.
    ///
    /// Stops at the first failure; later resources are not started.
    ///
    /// # Errors
    ///
    /// Returns the first start failure.
    pub async fn start_all(&self) -> Result<(), LifecycleError> {
        for handle in &self.plan {
            debug!(resource = handle.name(), "starting resource");
            handle.start().await?;
            debug!(resource = handle.name(), "resource started");
        }
        Ok(())
    }

    /// Stop every resource, draining failures instead of stopping early.
    ///
    /// Owned resources are stopped in declaration order, then any resource
    /// started only as a dependency is stopped in reverse start order.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or `LifecycleError::Aggregate` when more
    /// than one resource failed to stop.
    pub async fn stop_all(&self) -> Result<(), LifecycleError> {
        let mut failures = Vec::new();
        let stop_order = self.owned.iter().chain(self.dependency_only.iter().rev());

        for handle in stop_order {
            debug!(resource = handle.name(), "stopping resource");
            if let Err(error) = handle.stop().await {
                warn!(resource = handle.name(), %error, "resource failed to stop");
                failures.push(error);
            }
        }

        LifecycleError::from_failures(failures)
    }
}

/// Order resources so every dependency precedes its dependants, visiting
/// each distinct resource once.
fn start_plan(owned: &[ResourceHandle]) -> Vec<ResourceHandle> {
    let mut visited = HashSet::new();
    let mut plan = Vec::new();
    for handle in owned {
        visit(handle, &mut visited, &mut plan);
    }
    plan
}

fn visit(
    handle: &ResourceHandle,
    visited: &mut HashSet<*const ()>,
    plan: &mut Vec<ResourceHandle>,
) {
    if !visited.insert(handle.identity()) {
        return;
    }

    for dependency in handle.startable().dependencies() {
        visit(&ResourceHandle::new(dependency), visited, plan);
    }
    plan.push(handle.clone());
}
