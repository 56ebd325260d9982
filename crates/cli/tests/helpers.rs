use std::fs;

use lambda_audit::{canonicalize_or_current, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_keeps_absolute_missing_path() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("not-yet");
    let result = canonicalize_or_current(&missing.to_string_lossy()).expect("resolve");
    assert_eq!(result, missing);
}

#[test]
fn sha256_file_matches_known_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("functions.txt");
    fs::write(&path, "abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_file_reports_missing_file() {
    let tmp = tempdir().expect("tempdir");
    let err = sha256_file(&tmp.path().join("gone.txt")).unwrap_err();
    assert!(err.to_string().contains("Failed to open file for hashing"));
}
