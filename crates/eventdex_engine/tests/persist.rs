use std::fs;

use eventdex_engine::{read_snapshot, AtomicSnapshotWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_parent_dir() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("inventory.ron");
    let writer = AtomicSnapshotWriter::new(target.clone());

    writer.write("()").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "()");
}

#[test]
fn write_replaces_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("inventory.ron");
    let writer = AtomicSnapshotWriter::new(target.clone());

    writer.write("first").unwrap();
    writer.write("second").unwrap();
    assert_eq!(read_snapshot(&target).unwrap().as_deref(), Some("second"));
    let leftovers = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn missing_snapshot_reads_as_none() {
    let temp = TempDir::new().unwrap();
    assert_eq!(read_snapshot(&temp.path().join("absent.ron")).unwrap(), None);
}

#[test]
fn parent_that_is_a_file_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicSnapshotWriter::new(file_path.join("inventory.ron"));
    assert!(writer.write("data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
