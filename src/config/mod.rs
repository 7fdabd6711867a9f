//! Configuration system for testscope.
//!
//! Configuration loading and precedence merging is handled by the
//! `ortho_config` crate. Environment variables override configuration files,
//! which override defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///run/user/1000/podman/podman.sock"
//!
//! [lifecycle]
//! hook_order = "resource-first"
//!
//! [artifacts]
//! dir = "target/testscope-artifacts"
//! mode = "failing"
//! ```

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{env_var_names, load_config, load_config_with};
pub use types::{ArtifactConfig, LifecycleConfig, TestscopeConfig};
