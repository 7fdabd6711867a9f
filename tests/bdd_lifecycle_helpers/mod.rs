//! Behavioural step helpers for resource lifecycle scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{LifecycleState, lifecycle_state};
