use std::fs;
use std::sync::Arc;
use std::thread;

use crawler_engine::{ensure_output_dir, PersistError, ResultWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("plain_file");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_output_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}

#[test]
fn write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let writer = ResultWriter::new(temp.path());

    let first = writer.write("doc.md", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "doc.md");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("doc.md", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn parent_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let writer = ResultWriter::new(temp.path().join("missing"));

    let path = writer.write("sub/doc.md", "body").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "body");
}

#[test]
fn failed_write_leaves_no_stray_files() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("doc.md")).unwrap();
    let writer = ResultWriter::new(temp.path());

    assert!(writer.write("doc.md", "data").is_err());
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(temp.path().join("doc.md").is_dir());
}

#[test]
fn concurrent_writers_on_one_path_leave_a_complete_file() {
    let temp = TempDir::new().unwrap();
    let writer = Arc::new(ResultWriter::new(temp.path()));
    let bodies: Vec<String> = (0..8).map(|i| i.to_string().repeat(4096)).collect();

    let handles: Vec<_> = bodies
        .iter()
        .cloned()
        .map(|body| {
            let writer = writer.clone();
            thread::spawn(move || writer.write("same.md", &body).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(temp.path().join("same.md")).unwrap();
    assert!(bodies.contains(&content));
}
