//! Shared fixtures and helper functions for config tests.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::MockEnv;
use ortho_config::MergeComposer;
use rstest::fixture;

use crate::artifacts::RecordingMode;
use crate::config::TestscopeConfig;
use crate::listener::HookOrder;

/// Fixture providing a `TestscopeConfig` parsed from a full TOML example.
#[fixture]
pub fn config_from_full_toml() -> TestscopeConfig {
    let toml = r#"
        engine_socket = "unix:///run/podman/podman.sock"

        [lifecycle]
        hook_order = "resource-first"

        [artifacts]
        dir = "/tmp/testscope"
        mode = "all"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `TestscopeConfig` parsed from a minimal TOML example.
#[fixture]
pub fn config_from_partial_toml() -> TestscopeConfig {
    let toml = r#"
        [artifacts]
        mode = "skip"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(TestscopeConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `TestscopeConfig`.
pub fn merge_config(
    composer: MergeComposer,
) -> Result<TestscopeConfig, Arc<ortho_config::OrthoError>> {
    TestscopeConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &TestscopeConfig) {
    assert!(
        config.engine_socket.is_none(),
        "engine_socket should be None"
    );
    assert_eq!(
        config.lifecycle.hook_order,
        HookOrder::HookFirst,
        "lifecycle.hook_order should be HookFirst"
    );
    assert_eq!(
        config.artifacts.dir.as_str(),
        "target/testscope-artifacts",
        "artifacts.dir should be target/testscope-artifacts"
    );
    assert_eq!(
        config.artifacts.mode,
        RecordingMode::Failing,
        "artifacts.mode should be Failing"
    );
}

/// Helper: Builds a `MockEnv` answering from a fixed variable table.
pub fn env_with(vars: &[(&str, &str)]) -> MockEnv {
    let table: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (String::from(*key), String::from(*value)))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| table.get(key).cloned());
    env
}
