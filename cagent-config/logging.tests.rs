use std::io::Write as _;

use super::*;

#[test]
fn rotates_once_the_size_bound_is_exceeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.log");
    let mut writer = SizeRotatingFile::open(path.clone(), 16).unwrap();

    writer.write_all(b"0123456789").unwrap();
    writer.flush().unwrap();
    assert!(!writer.backup_path.exists());

    writer.write_all(b"0123456789").unwrap();
    writer.flush().unwrap();

    assert!(writer.backup_path.exists());
    let backup = std::fs::read_to_string(&writer.backup_path).unwrap();
    assert_eq!(backup, "0123456789");
    let current = std::fs::read_to_string(&path).unwrap();
    assert_eq!(current, "0123456789");
}

#[test]
fn level_directive_reflects_debug_flag() {
    assert!(level_directive(true).contains("=debug"));
    assert!(level_directive(false).contains("=info"));
}
