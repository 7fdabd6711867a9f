//! Integration tests for configuration loading against the real process
//! environment.


use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use mockable::DefaultEnv;
use serial_test::serial;
use tempfile::NamedTempFile;
use testscope::artifacts::RecordingMode;
use testscope::config::load_config_with;
use testscope::error::{ConfigError, TestscopeError};
use testscope::listener::HookOrder;
use test_utils::{clear_testscope_env, set_env};

fn temp_config_file(content: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

fn utf8_path(file: &NamedTempFile) -> Utf8PathBuf {
    Utf8PathBuf::try_from(file.path().to_path_buf()).expect("path should be valid UTF-8")
}

#[test]
#[serial]
fn missing_config_file_yields_defaults() {
    let _guard = clear_testscope_env();

    let config = load_config_with(
        &DefaultEnv::new(),
        Some(Utf8Path::new("/nonexistent/testscope.toml")),
    )
    .expect("defaults should load");

    assert!(config.engine_socket.is_none());
    assert_eq!(config.lifecycle.hook_order, HookOrder::HookFirst);
    assert_eq!(config.artifacts.mode, RecordingMode::Failing);
}

#[test]
#[serial]
fn environment_overrides_config_file() {
    let guard = clear_testscope_env();
    let file = temp_config_file(
        r#"
        engine_socket = "unix:///from/file.sock"

        [lifecycle]
        hook_order = "hook-first"

        [artifacts]
        mode = "skip"
    "#,
    )
    .expect("temp config should be written");
    set_env(&guard, "TESTSCOPE_ENGINE_SOCKET", "unix:///from/env.sock");
    set_env(&guard, "TESTSCOPE_LIFECYCLE_HOOK_ORDER", "resource-first");

    let config = load_config_with(&DefaultEnv::new(), Some(utf8_path(&file).as_path()))
        .expect("config should load");

    assert_eq!(config.engine_socket.as_deref(), Some("unix:///from/env.sock"));
    assert_eq!(config.lifecycle.hook_order, HookOrder::ResourceFirst);
    assert_eq!(config.artifacts.mode, RecordingMode::Skip);
}

#[test]
#[serial]
fn invalid_recording_mode_in_environment_is_rejected() {
    let guard = clear_testscope_env();
    set_env(&guard, "TESTSCOPE_ARTIFACTS_MODE", "sometimes");

    let error = load_config_with(
        &DefaultEnv::new(),
        Some(Utf8Path::new("/nonexistent/testscope.toml")),
    )
    .expect_err("invalid mode should fail");

    assert!(matches!(
        error,
        TestscopeError::Config(ConfigError::InvalidValue { ref field, .. })
            if field == "TESTSCOPE_ARTIFACTS_MODE"
    ));
}
