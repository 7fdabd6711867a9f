//! Unit tests for recording modes and the artifact writer.

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn artifact_root() -> TempDir {
    TempDir::new().expect("temp dir should be created")
}

fn writer_in(root: &TempDir, mode: RecordingMode) -> ArtifactWriter {
    let dir = Utf8PathBuf::try_from(root.path().join("artifacts"))
        .expect("temp path should be UTF-8");
    ArtifactWriter::new(dir, mode)
}

#[rstest]
#[case(RecordingMode::All, true, true)]
#[case(RecordingMode::All, false, true)]
#[case(RecordingMode::Failing, true, false)]
#[case(RecordingMode::Failing, false, true)]
#[case(RecordingMode::Skip, true, false)]
#[case(RecordingMode::Skip, false, false)]
fn recording_mode_selects_outcomes(
    #[case] mode: RecordingMode,
    #[case] succeeded: bool,
    #[case] expected: bool,
) {
    assert_eq!(mode.should_record(succeeded), expected);
}

#[rstest]
#[case("all", Some(RecordingMode::All))]
#[case("failing", Some(RecordingMode::Failing))]
#[case(" skip", Some(RecordingMode::Skip))]
#[case("sometimes", None)]
fn recording_mode_parses_config_names(
    #[case] input: &str,
    #[case] expected: Option<RecordingMode>,
) {
    assert_eq!(RecordingMode::parse(input), expected);
}

#[rstest]
fn relative_path_encodes_resource_and_test_names() {
    let description = TestDescription::new("app.UserSpec", "creates a/b user");

    let path = ArtifactWriter::relative_path("postgres db", &description, false);

    assert_eq!(path, Utf8PathBuf::from("postgres%20db/creates%20a%2Fb%20user-FAILED.log"));
}

#[rstest]
fn failing_mode_writes_failed_test_logs(artifact_root: TempDir) {
    let writer = writer_in(&artifact_root, RecordingMode::Failing);
    let description = TestDescription::new("app.Spec", "breaks");

    let written = writer
        .record("db", &description, false, b"connection refused\n")
        .expect("artifact should be written")
        .expect("failing test should be recorded");

    assert!(written.as_str().ends_with("db/breaks-FAILED.log"));
    let contents = std::fs::read_to_string(&written).expect("artifact should be readable");
    assert_eq!(contents, "connection refused\n");
}

#[rstest]
fn failing_mode_discards_passing_test_logs(artifact_root: TempDir) {
    let writer = writer_in(&artifact_root, RecordingMode::Failing);
    let description = TestDescription::new("app.Spec", "works");

    let written = writer
        .record("db", &description, true, b"ok\n")
        .expect("discarding should succeed");

    assert!(written.is_none());
    assert!(!writer.dir().exists());
}

#[rstest]
fn all_mode_keeps_passing_test_logs(artifact_root: TempDir) {
    let writer = writer_in(&artifact_root, RecordingMode::All);
    let description = TestDescription::new("app.Spec", "works");

    let written = writer
        .record("db", &description, true, b"ok\n")
        .expect("artifact should be written");

    assert!(written.is_some_and(|path| path.as_str().ends_with("db/works-PASSED.log")));
}

#[rstest]
fn default_writer_targets_build_directory() {
    let writer = ArtifactWriter::default();

    assert_eq!(writer.dir(), Utf8Path::new(DEFAULT_ARTIFACT_DIR));
    assert_eq!(writer.mode(), RecordingMode::Failing);
}
