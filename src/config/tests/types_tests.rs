//! Section defaults and TOML parsing tests.

use camino::Utf8PathBuf;
use rstest::rstest;

use crate::artifacts::RecordingMode;
use crate::config::tests::helpers::{
    assert_config_has_defaults, config_from_full_toml, config_from_partial_toml,
};
use crate::config::{ArtifactConfig, LifecycleConfig, TestscopeConfig};
use crate::listener::HookOrder;

#[rstest]
fn default_config_uses_documented_values() {
    assert_config_has_defaults(&TestscopeConfig::default());
}

#[rstest]
fn full_toml_populates_every_section(config_from_full_toml: TestscopeConfig) {
    assert_eq!(
        config_from_full_toml.engine_socket.as_deref(),
        Some("unix:///run/podman/podman.sock")
    );
    assert_eq!(
        config_from_full_toml.lifecycle,
        LifecycleConfig {
            hook_order: HookOrder::ResourceFirst,
        }
    );
    assert_eq!(
        config_from_full_toml.artifacts,
        ArtifactConfig {
            dir: Utf8PathBuf::from("/tmp/testscope"),
            mode: RecordingMode::All,
        }
    );
}

#[rstest]
fn partial_toml_keeps_defaults_for_missing_fields(config_from_partial_toml: TestscopeConfig) {
    assert_eq!(config_from_partial_toml.artifacts.mode, RecordingMode::Skip);
    assert_eq!(
        config_from_partial_toml.artifacts.dir.as_str(),
        "target/testscope-artifacts"
    );
    assert_eq!(
        config_from_partial_toml.lifecycle.hook_order,
        HookOrder::HookFirst
    );
}

#[rstest]
#[case(HookOrder::HookFirst, "\"hook-first\"")]
#[case(HookOrder::ResourceFirst, "\"resource-first\"")]
fn hook_order_serialises_kebab_case(#[case] order: HookOrder, #[case] expected: &str) {
    let serialised = serde_json::to_string(&order).expect("serialisation should succeed");
    assert_eq!(serialised, expected);
}

#[rstest]
fn unknown_recording_mode_is_rejected() {
    let result = toml::from_str::<TestscopeConfig>("[artifacts]\nmode = \"sometimes\"\n");
    assert!(result.is_err(), "unknown recording mode should not parse");
}

#[rstest]
fn artifact_config_builds_matching_writer(config_from_full_toml: TestscopeConfig) {
    let writer = config_from_full_toml.artifacts.writer();

    assert_eq!(writer.dir().as_str(), "/tmp/testscope");
    assert_eq!(writer.mode(), RecordingMode::All);
}
