//! End-to-end: write real log bytes to disk, load them, seed the default
//! groups, extend with a user group, and check the resulting plans.

use std::path::PathBuf;

use hwinfo_viewer::data::loader::{self, Encoding, LoadError, LoadOptions};
use hwinfo_viewer::groups::registry::{AxisKind, GroupRegistry, GroupSpec};

/// Write `bytes` into the temp dir and return the file path.
fn write_log(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write sample log");
    path
}

/// A stable capture, Latin-1 encoded: the degree sign in "CPU [°C]" is the
/// single byte 0xB0.
fn stable_log_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Date,Time,CPU [\xB0C],CPU [RPM],CPU Package Power (SMU) [W],Throttling,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:00.000,45.0,900,42.5,No,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:01.000,47.5,950,55.0,No,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:02.000,61.0,1400,88.0,Yes,\r\n");
    bytes.extend_from_slice(b"Date,Time,CPU [\xB0C],CPU [RPM],CPU Package Power (SMU) [W],Throttling,\r\n");
    bytes.extend_from_slice(b"Average,,51.1,1083,61.8,,\r\n");
    bytes
}

#[test]
fn stable_log_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "stable.csv", &stable_log_bytes());

    let outcome = loader::load_file(&path, &LoadOptions::default()).unwrap();
    assert!(outcome.drift.is_none());
    let table = outcome.table;
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_columns(), 6);
    assert_eq!(table.capture_date().as_deref(), Some("6.8.2026"));

    let registry = GroupRegistry::with_defaults(&table).unwrap();

    // The Latin-1 degree sign survives decoding and drives the temperature
    // group.
    let plan = registry.build_visibility_plan("Temperature").unwrap();
    let visible: Vec<&str> = registry
        .left_columns()
        .iter()
        .zip(plan.left.visible.iter())
        .filter(|(_, &v)| v)
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(visible, vec!["CPU [°C]"]);
    assert_eq!(plan.left.kind, AxisKind::Linear);

    // Throttling carries "No"/"Yes" text, so its axis is categorical.
    let plan = registry.build_visibility_plan("Throttling").unwrap();
    assert_eq!(plan.left.kind, AxisKind::Categorical);

    // The composite builtin lights up the right axis.
    let plan = registry.build_visibility_plan("CPU Fan/Power").unwrap();
    assert!(plan.show_right);
    assert_eq!(plan.right.kind, AxisKind::Linear);
}

/// A capture where "GPU [W]" comes online at the third sample.
fn drift_log_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Date,Time,CPU [W],\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:00.000,42.5,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:01.000,55.0,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:02.000,88.0,17.0,\r\n");
    bytes.extend_from_slice(b"6.8.2026,14:30:03.000,86.5,18.5,\r\n");
    bytes.extend_from_slice(b"Date,Time,CPU [W],GPU [W],\r\n");
    bytes.extend_from_slice(b"Average,,68.0,17.7,\r\n");
    bytes
}

#[test]
fn drift_log_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "drift.csv", &drift_log_bytes());

    let outcome = loader::load_file(&path, &LoadOptions::default()).unwrap();
    let drift = outcome.drift.expect("repair must report itself");
    assert_eq!(drift.padded_rows, 2);

    let table = outcome.table;
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names, vec!["Date", "Time", "CPU [W]", "GPU [W]"]);
    assert_eq!(table.n_rows(), 4);

    let gpu = table.column("GPU [W]").unwrap();
    assert_eq!(
        gpu.numeric_values().unwrap(),
        &[None, None, Some(17.0), Some(18.5)]
    );

    // Both wattage columns land in the builtin Power group; a user group can
    // then single out the late sensor.
    let mut registry = GroupRegistry::with_defaults(&table).unwrap();
    let plan = registry.build_visibility_plan("Power").unwrap();
    assert_eq!(plan.left.visible, vec![true, true]);

    let spec = GroupSpec::parse("GPU only,W,GPU").unwrap();
    registry.add_group(spec, &table).unwrap();
    let plan = registry.build_visibility_plan("GPU only").unwrap();
    assert_eq!(plan.left.visible, vec![false, true]);
    assert_eq!(plan.left.kind, AxisKind::Linear);
    assert!(!plan.show_right);
}

#[test]
fn utf8_mismatch_is_fatal_with_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "latin1.csv", &stable_log_bytes());

    let options = LoadOptions {
        encoding: Encoding::Utf8,
        ..LoadOptions::default()
    };
    match loader::load_file(&path, &options) {
        Err(LoadError::Decoding {
            encoding, position, ..
        }) => {
            assert_eq!(encoding, "utf-8");
            assert_eq!(position, 15);
        }
        other => panic!("expected Decoding error, got {other:?}"),
    }
}

#[test]
fn missing_file_reports_path() {
    let err = loader::load_file(
        std::path::Path::new("/no/such/file.csv"),
        &LoadOptions::default(),
    )
    .unwrap_err();
    match err {
        LoadError::Io { path, .. } => assert_eq!(path, PathBuf::from("/no/such/file.csv")),
        other => panic!("expected Io error, got {other:?}"),
    }
}
