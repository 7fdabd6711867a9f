//! Configuration loading with layered precedence.
//!
//! Layers are composed manually with `MergeComposer` rather than through the
//! derived `load()`, because the environment layer of `OrthoConfig` silently
//! ignores values it cannot parse. This loader validates typed environment
//! variables up front and fails fast instead:
//! `TESTSCOPE_LIFECYCLE_HOOK_ORDER=sideways` is an error, not a silent
//! fallback to the default.
//!
//! String fields (`TESTSCOPE_ENGINE_SOCKET`, `TESTSCOPE_ARTIFACTS_DIR`) are
//! always accepted.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::artifacts::RecordingMode;
use crate::config::TestscopeConfig;
use crate::error::{ConfigError, Result};
use crate::listener::HookOrder;

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// A [`HookOrder`] name. Invalid values return an error.
    HookOrder,
    /// A [`RecordingMode`] name. Invalid values return an error.
    RecordingMode,
}

/// Mapping from one environment variable to a configuration path.
struct EnvVarSpec {
    /// The environment variable name (e.g., `TESTSCOPE_ENGINE_SOCKET`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["artifacts", "mode"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "TESTSCOPE_ENGINE_SOCKET",
        path: &["engine_socket"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "TESTSCOPE_LIFECYCLE_HOOK_ORDER",
        path: &["lifecycle", "hook_order"],
        var_type: EnvVarType::HookOrder,
    },
    EnvVarSpec {
        env_var: "TESTSCOPE_ARTIFACTS_DIR",
        path: &["artifacts", "dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "TESTSCOPE_ARTIFACTS_MODE",
        path: &["artifacts", "mode"],
        var_type: EnvVarType::RecordingMode,
    },
];

/// Returns the list of environment variable names recognised by the config
/// loader.
///
/// Tests use this to clear every `TESTSCOPE_*` variable without keeping a
/// separate hard-coded list.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load configuration from the discovered file and the process environment.
///
/// # Errors
///
/// Returns `ConfigError` when the configuration file is malformed, a typed
/// environment variable holds an invalid value, or the merged layers do not
/// form a valid configuration.
pub fn load_config() -> Result<TestscopeConfig> {
    load_config_with(&DefaultEnv::new(), None)
}

/// Load configuration with an explicit environment provider.
///
/// `config_path`, when given and present on disk, takes the place of file
/// discovery.
///
/// # Errors
///
/// Returns `ConfigError` when the configuration file is malformed, a typed
/// environment variable holds an invalid value, or the merged layers do not
/// form a valid configuration.
pub fn load_config_with<E: Env>(
    env: &E,
    config_path: Option<&Utf8Path>,
) -> Result<TestscopeConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(TestscopeConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    let file = config_path
        .filter(|path| path.exists())
        .map(Utf8Path::to_path_buf)
        .or_else(discover_config_file);
    if let Some(ref path) = file {
        debug!(path = %path, "loading configuration file");
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let config = TestscopeConfig::merge_from_layers(composer.layers())
        .map_err(ConfigError::OrthoConfig)?;
    Ok(config)
}

fn discover_config_file() -> Option<Utf8PathBuf> {
    ConfigDiscovery::builder("testscope")
        .env_var("TESTSCOPE_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".testscope.toml")
        .build()
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok())
}

/// Load a configuration file and push it to the composer.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Collect `TESTSCOPE_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable has a value its
/// type does not accept.
fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::HookOrder => {
                let order = HookOrder::parse(&raw_value).ok_or_else(|| ConfigError::InvalidValue {
                    field: spec.env_var.to_owned(),
                    reason: format!("expected hook-first or resource-first, got '{raw_value}'"),
                })?;
                serde_json::to_value(order).map_err(|e| ConfigError::ParseError {
                    message: format!("failed to serialise {}: {e}", spec.env_var),
                })?
            }
            EnvVarType::RecordingMode => {
                let mode =
                    RecordingMode::parse(&raw_value).ok_or_else(|| ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected all, failing or skip, got '{raw_value}'"),
                    })?;
                serde_json::to_value(mode).map_err(|e| ConfigError::ParseError {
                    message: format!("failed to serialise {}: {e}", spec.env_var),
                })?
            }
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating intermediate
/// objects as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}
