use std::path::PathBuf;

use orthostat_cli::config::{
    load_config_from, migrate, save_config_to, OrthostatConfig, CURRENT_VERSION,
};
use orthostat_export::styles::PaperSize;

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = OrthostatConfig::default();
    config.clinic.name = "Autonomic Lab".to_string();
    config.report.paper = PaperSize::Letter;
    config.protocol.auto_advance_to_standing = true;
    config.output_dir = Some(PathBuf::from("/tmp/reports"));

    save_config_to(&path, &config).unwrap();
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn v0_clinic_fields_are_grouped() {
    let v0 = serde_json::json!({
        "clinic_name": "Heart Clinic",
        "clinic_phone": "555-0100",
        "protocol": { "measurement_interval_secs": 60 }
    });

    let migrated = migrate(v0, 0).unwrap();
    assert_eq!(migrated["config_version"], 1);
    assert_eq!(migrated["clinic"]["name"], "Heart Clinic");
    assert!(migrated.get("clinic_name").is_none());

    let config: OrthostatConfig = serde_json::from_value(migrated).unwrap();
    assert_eq!(config.clinic.phone.as_deref(), Some("555-0100"));
    assert_eq!(config.protocol.measurement_interval_secs, 60);
    assert_eq!(config.protocol.phase_duration_secs, 600);
}

#[test]
fn newer_versions_are_refused() {
    let json = serde_json::json!({ "config_version": CURRENT_VERSION + 1 });
    assert!(migrate(json, CURRENT_VERSION + 1).is_err());
}

#[test]
fn invalid_protocol_is_refused_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"config_version":1,"protocol":{"measurement_interval_secs":0}}"#,
    )
    .unwrap();

    assert!(load_config_from(&path).is_err());
}

#[test]
fn oversized_capture_is_refused_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"config_version":1,"capture":{"width":4000000000,"scale":4}}"#,
    )
    .unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}
