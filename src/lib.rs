//! Test-scoped lifecycle management for external resources.
//!
//! `testscope` binds resources with an explicit start/stop lifecycle, such as
//! containers, databases or mock servers, to the lifecycle of a test driver.
//! A resource implements [`lifecycle::Startable`] and is wrapped in a
//! listener that decides when it runs:
//!
//! - [`listener::PerTestListener`]: a fresh start and stop around every test.
//! - [`listener::PerSpecListener`]: one start and one stop around a spec.
//! - [`listener::PerRunListener`]: one start for a whole driver run.
//!
//! Resources that also implement [`lifecycle::TestLifecycleAware`] receive a
//! [`lifecycle::TestDescription`] before and after each test, which they can
//! use to label recordings or logs.
//!
//! # Modules
//!
//! - [`lifecycle`]: Resource contracts, test metadata and ordered resource sets
//! - [`listener`]: Listeners binding resources to spec and test boundaries
//! - [`runner`]: A small sequential driver for specs and listeners
//! - [`engine`]: Container engine connection and engine-backed resources
//! - [`artifacts`]: Per-test artifact recording
//! - [`config`]: Configuration with layered precedence (env > file > defaults)
//! - [`error`]: Semantic error types

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod listener;
pub mod runner;
