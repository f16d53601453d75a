use super::*;

#[test]
fn reads_true_case_and_whitespace_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("epsagon_debug");
    std::fs::write(&path, "  TRUE\n").unwrap();

    assert_eq!(read_debug_flag(&path), Some(true));
}

#[test]
fn reads_false_for_any_other_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("epsagon_debug");
    std::fs::write(&path, "false").unwrap();

    assert_eq!(read_debug_flag(&path), Some(false));
}

#[test]
fn missing_file_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist");

    assert_eq!(read_debug_flag(&path), None);
}
