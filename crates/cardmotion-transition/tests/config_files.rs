#![cfg(feature = "config")]

//! Loading `TransitionConfig` from files on disk.

use std::io::Write;

use cardmotion_transition::{ConfigError, TransitionConfig};

fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(body.as_bytes()).expect("write");
    file
}

#[test]
fn toml_file_overrides_only_named_fields() {
    let file = write_temp(
        ".toml",
        r#"
[gesture]
progress_distance = 140.0
rejection_message = "Reveal the answer first"

[backdrop]
max_opacity = 0.4
"#,
    );

    let config = TransitionConfig::from_toml_file(file.path()).expect("load");
    assert_eq!(config.gesture.progress_distance, 140.0);
    assert_eq!(config.gesture.rejection_message, "Reveal the answer first");
    assert_eq!(config.backdrop.max_opacity, 0.4);
    assert_eq!(config.present, TransitionConfig::default().present);
    assert_eq!(config.dismiss, TransitionConfig::default().dismiss);
    assert!(config.validate().is_empty());
}

#[test]
fn json_file_loads_nested_sections() {
    let file = write_temp(
        ".json",
        r#"{
  "dismiss": { "damping": 0.8 },
  "gesture": { "shrink_scale": 0.9, "rejection_reenable_delay_secs": 0.5 }
}"#,
    );

    let config = TransitionConfig::from_json_file(file.path()).expect("load");
    assert_eq!(config.dismiss.damping, 0.8);
    assert_eq!(config.gesture.shrink_scale, 0.9);
    assert_eq!(
        config.gesture.rejection_reenable_delay(),
        Some(std::time::Duration::from_millis(500))
    );
    assert_eq!(config.dismiss.duration_secs, 0.5);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = TransitionConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_temp(".toml", "[gesture\nprogress_distance = 1");
    let err = TransitionConfig::from_toml_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn out_of_range_values_fail_validation() {
    let file = write_temp(
        ".toml",
        r#"
[present]
min_damping = 0.9
max_damping = 0.5

[gesture]
progress_distance = -10.0
"#,
    );

    let err = TransitionConfig::from_toml_file(file.path())
        .and_then(TransitionConfig::validated)
        .unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("damping range")));
    assert!(errors.iter().any(|e| e.contains("progress_distance")));
}
