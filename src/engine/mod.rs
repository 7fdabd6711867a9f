//! Container engine endpoints and engine-backed resources.
//!
//! The endpoint is taken from the first non-blank source:
//!
//! 1. Config file (`engine_socket` in TOML) or `TESTSCOPE_ENGINE_SOCKET`
//! 2. `DOCKER_HOST`, `CONTAINER_HOST`, then `PODMAN_HOST`
//! 3. Platform default (`/var/run/docker.sock` on Unix)

mod connection;
mod container;

pub use connection::{EndpointResolver, EngineEndpoint};
pub use container::{
    ContainerActionFuture, ContainerLifecycleClient, ContainerLogsFuture, EngineContainer,
};
