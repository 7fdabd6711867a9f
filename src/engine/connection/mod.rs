//! Where the container engine listens, and how to reach it.
//!
//! Engine-backed resources share one [`EngineEndpoint`], picked by
//! [`EndpointResolver`] from the first non-blank source: the configured
//! `engine_socket`, then the host variables Docker and Podman tooling
//! already honour, then the platform default.

use std::fmt;

use bollard::{API_DEFAULT_VERSION, Docker};
use mockable::Env;
use tracing::debug;

use crate::config::TestscopeConfig;
use crate::error::ContainerError;

/// Host variables consulted, in order, when no socket is configured.
const HOST_ENV_VARS: [&str; 3] = ["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Seconds Bollard waits on a single engine request.
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[cfg(unix)]
const PLATFORM_DEFAULT: &str = "unix:///var/run/docker.sock";

#[cfg(windows)]
const PLATFORM_DEFAULT: &str = "npipe:////./pipe/docker_engine";

/// A container engine endpoint, normalised to a URI Bollard accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEndpoint {
    /// A `unix://` socket or `npipe://` named pipe.
    Socket(String),
    /// An `http://` or `https://` URL.
    Http(String),
}

impl EngineEndpoint {
    /// Classify a raw endpoint.
    ///
    /// `tcp://` hosts become `http://`. Bare paths starting with `//` or
    /// `\\` are named pipes and any other bare path is a Unix socket; the
    /// choice is made from the syntax, not the platform.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let endpoint = raw.trim();
        if let Some(host) = endpoint.strip_prefix("tcp://") {
            return Self::Http(format!("http://{host}"));
        }
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Self::Http(String::from(endpoint));
        }
        if endpoint.starts_with("unix://") || endpoint.starts_with("npipe://") {
            return Self::Socket(String::from(endpoint));
        }
        if endpoint.starts_with("//") || endpoint.starts_with("\\\\") {
            return Self::Socket(format!("npipe://{endpoint}"));
        }
        Self::Socket(format!("unix://{endpoint}"))
    }

    /// Resolve the endpoint for a loaded configuration.
    #[must_use]
    pub fn from_config<E: Env>(config: &TestscopeConfig, env: &E) -> Self {
        EndpointResolver::new(env)
            .with_configured(config.engine_socket.as_deref())
            .resolve()
    }

    /// Returns the normalised URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::Socket(uri) | Self::Http(uri) => uri,
        }
    }

    /// Build a client for this endpoint.
    ///
    /// Bollard does not contact the engine until the first request, so a
    /// missing daemon surfaces later as a start or stop failure.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::ConnectionFailed` when Bollard rejects the
    /// endpoint.
    pub fn connect(&self) -> Result<Docker, ContainerError> {
        debug!(endpoint = %self, "connecting to container engine");
        let client = match self {
            Self::Socket(uri) => {
                Docker::connect_with_socket(uri, REQUEST_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            Self::Http(url) => {
                Docker::connect_with_http(url, REQUEST_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
        };
        client.map_err(|error| ContainerError::ConnectionFailed {
            message: format!("{self}: {error}"),
        })
    }
}

impl fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// Picks an [`EngineEndpoint`] from configuration and the environment.
pub struct EndpointResolver<'a, E: Env> {
    env: &'a E,
    configured: Option<&'a str>,
}

impl<'a, E: Env> EndpointResolver<'a, E> {
    /// Create a resolver reading host variables from `env`.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self {
            env,
            configured: None,
        }
    }

    /// Prefer `socket` over the environment when it is not blank.
    #[must_use]
    pub const fn with_configured(mut self, socket: Option<&'a str>) -> Self {
        self.configured = socket;
        self
    }

    /// Returns the first non-blank host variable.
    #[must_use]
    pub fn env_host(&self) -> Option<String> {
        HOST_ENV_VARS
            .iter()
            .filter_map(|name| self.env.string(name))
            .find(|host| !host.trim().is_empty())
    }

    /// Resolve the endpoint, falling back to the platform default.
    #[must_use]
    pub fn resolve(&self) -> EngineEndpoint {
        let raw = self
            .configured
            .filter(|socket| !socket.trim().is_empty())
            .map(String::from)
            .or_else(|| self.env_host())
            .unwrap_or_else(|| String::from(PLATFORM_DEFAULT));
        EngineEndpoint::parse(&raw)
    }
}
