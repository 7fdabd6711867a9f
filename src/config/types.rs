//! Configuration data types for testscope.

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactWriter, DEFAULT_ARTIFACT_DIR, RecordingMode};
use crate::listener::HookOrder;

/// Listener behaviour configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Where per-test listeners deliver the pre-test hook relative to
    /// `start`.
    pub hook_order: HookOrder,
}

/// Per-test artifact configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory artifacts are written beneath.
    pub dir: Utf8PathBuf,

    /// Which test outcomes keep their artifacts.
    pub mode: RecordingMode,
}

impl ArtifactConfig {
    /// Build a writer from this configuration.
    #[must_use]
    pub fn writer(&self) -> ArtifactWriter {
        ArtifactWriter::new(self.dir.clone(), self.mode)
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from(DEFAULT_ARTIFACT_DIR),
            mode: RecordingMode::default(),
        }
    }
}

/// Root testscope configuration.
///
/// Loaded with layered precedence, lowest to highest: defaults,
/// configuration file, environment variables.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `TESTSCOPE_CONFIG_PATH` environment variable
/// 2. `.testscope.toml` in the current working directory
/// 3. `.testscope.toml` in the home directory
/// 4. `~/.config/testscope/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "TESTSCOPE",
    post_merge_hook,
    discovery(
        app_name = "testscope",
        env_var = "TESTSCOPE_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".testscope.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct TestscopeConfig {
    /// The container engine socket path or URL used by engine-backed
    /// resources.
    pub engine_socket: Option<String>,

    /// Listener behaviour.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub lifecycle: LifecycleConfig,

    /// Per-test artifacts.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub artifacts: ArtifactConfig,
}

impl PostMergeHook for TestscopeConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // A blank socket means "resolve from the environment".
        self.engine_socket = self
            .engine_socket
            .take()
            .map(|socket| socket.trim().to_owned())
            .filter(|socket| !socket.is_empty());
        Ok(())
    }
}
