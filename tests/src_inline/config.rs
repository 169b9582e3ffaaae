use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_luminexqc_config_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn valid() -> PipelineConfig {
    PipelineConfig {
        protocol: "IL6".to_string(),
        ..PipelineConfig::default()
    }
}

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.plate_count, 1);
    assert_eq!(config.plate_types, vec![String::new()]);
    assert_eq!(config.thresholds, Thresholds::default_v1());
    assert_eq!(config.palette.warning_color, "FFFFA500");
    assert_eq!(config.palette.error_color, "FFFF0000");
    assert_eq!(config.control_policy, ControlPolicy::default());
    assert!(!config.include_perplate_controls);
}

#[test]
fn test_load_partial_config_falls_back_to_defaults() {
    let dir = make_temp_dir();
    let path = dir.join("qc.json");
    fs::write(
        &path,
        r#"{
            "protocol": "IL6",
            "plate_count": 3,
            "plate_types": ["a", "b"],
            "cv_error": 30,
            "bead_cutoff": 50,
            "control_policy": {"explicit_list": {"names": ["QC"]}},
            "include_perplate_controls": true
        }"#,
    )
    .unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.protocol, "IL6");
    assert_eq!(config.plate_count, 3);
    assert_eq!(config.plate_types, vec!["a", "b"]);
    assert_eq!(config.thresholds.cv_error, 30.0);
    assert_eq!(config.thresholds.cv_warning, 10.0);
    assert_eq!(config.thresholds.bead_cutoff, 50);
    assert!(config.include_perplate_controls);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_invalid_json() {
    let dir = make_temp_dir();
    let path = dir.join("bad.json");
    fs::write(&path, "{ protocol: ").unwrap();
    assert!(matches!(
        load_config(&path),
        Err(ConfigError::Json { .. })
    ));
}

#[test]
fn test_validate_rejects_bad_values() {
    assert!(PipelineConfig::default().validate().is_err());
    assert!(valid().validate().is_ok());

    let mut c = valid();
    c.plate_count = 0;
    assert!(c.validate().is_err());

    let mut c = valid();
    c.plate_types.clear();
    assert!(c.validate().is_err());

    let mut c = valid();
    c.thresholds.cv_warning = 30.0;
    assert!(c.validate().is_err());

    let mut c = valid();
    c.thresholds.zsc_warning = 3.0;
    assert!(c.validate().is_err());

    let mut c = valid();
    c.control_policy = ControlPolicy::ExplicitList { names: vec![] };
    assert!(c.validate().is_err());
}

#[test]
fn test_output_names() {
    let c = valid();
    assert_eq!(c.combined_name(), "IL6_results_combined");
    assert_eq!(c.master_name(), "IL6_results_master");
    assert_eq!(c.report_name(), "IL6_qc_report.txt");
}
