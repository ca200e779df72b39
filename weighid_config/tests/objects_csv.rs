use std::fs;

use rstest::rstest;
use tempfile::tempdir;
use weighid_config::{ObjectRow, load_objects_csv, validate_objects};

fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("objects.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn loads_rows_in_file_order() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "slot,weight,tolerance\n1,100.0,5\n 2 , 250.5 , 4.5 \n");
    let rows = load_objects_csv(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            ObjectRow {
                slot: 1,
                weight: 100.0,
                tolerance: 5.0
            },
            ObjectRow {
                slot: 2,
                weight: 250.5,
                tolerance: 4.5
            },
        ]
    );
}

#[rstest]
#[case("raw,grams\n1,2\n", "must have headers")]
#[case("slot,weight,tolerance\n", "no rows")]
#[case("slot,weight,tolerance\n1,abc,5\n", "invalid CSV row 2")]
#[case("slot,weight,tolerance\n9,100,5\n", "out of range")]
#[case("slot,weight,tolerance\n1,100,5\n1,120,5\n", "duplicate slot")]
fn rejects_bad_files(#[case] body: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, body);
    let err = load_objects_csv(&path).expect_err("should fail");
    assert!(
        format!("{err}").contains(needle),
        "error {err} should mention {needle}"
    );
}

#[test]
fn missing_file_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let err = load_objects_csv(&dir.path().join("nope.csv")).expect_err("missing file");
    assert!(format!("{err}").contains("open objects CSV"));
}

#[test]
fn zero_tolerance_is_allowed() {
    let rows = [ObjectRow {
        slot: 0,
        weight: 0.0,
        tolerance: 0.0,
    }];
    validate_objects(&rows).unwrap();
}
