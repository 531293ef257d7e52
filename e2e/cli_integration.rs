//! CLI integration tests: exercises the `pcompress` binary as a black box
//! via `std::process::Command` (spec §6 "CLI surface").

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn pcompress_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_pcompress") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("pcompress");
    p
}

fn make_temp_input() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.txt");
    let content = "Hello, pcompress!\n".repeat(341);
    fs::write(&input_path, content).unwrap();
    (dir, input_path)
}

#[test]
fn compress_decompress_roundtrip() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();

    let compressed = dir.path().join("output.pz");
    let roundtrip = dir.path().join("roundtrip.txt");

    let status = Command::new(pcompress_bin())
        .args([input.to_str().unwrap(), compressed.to_str().unwrap()])
        .status()
        .expect("failed to run pcompress compress");
    assert!(status.success(), "compress step should exit 0");
    assert!(compressed.exists());

    let status = Command::new(pcompress_bin())
        .args(["-d", compressed.to_str().unwrap(), roundtrip.to_str().unwrap()])
        .status()
        .expect("failed to run pcompress decompress");
    assert!(status.success(), "decompress step should exit 0");

    let recovered = fs::read(&roundtrip).unwrap();
    assert_eq!(original, recovered);
}

#[test]
fn help_prints_usage() {
    let output = Command::new(pcompress_bin())
        .arg("--help")
        .output()
        .expect("failed to run pcompress --help");
    assert!(output.status.success());
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(combined.to_lowercase().contains("usage"));
}

#[test]
fn refuses_to_overwrite_existing_output() {
    let (dir, input) = make_temp_input();
    let compressed = dir.path().join("exists.pz");
    fs::write(&compressed, b"not really compressed").unwrap();

    let status = Command::new(pcompress_bin())
        .args([input.to_str().unwrap(), compressed.to_str().unwrap()])
        .status()
        .expect("failed to run pcompress");
    assert!(!status.success(), "must refuse to clobber an existing output file");
}

#[test]
fn nonexistent_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pz");
    let status = Command::new(pcompress_bin())
        .args(["/nonexistent_path_abc123_pcompress_test", output.to_str().unwrap()])
        .status()
        .expect("failed to run pcompress with nonexistent input");
    assert!(!status.success());
}

#[test]
fn unknown_option_is_bad_usage() {
    let (dir, input) = make_temp_input();
    let output = dir.path().join("out.pz");
    let result = Command::new(pcompress_bin())
        .args(["-Q", input.to_str().unwrap(), output.to_str().unwrap()])
        .output()
        .expect("failed to run pcompress");
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("bad usage"), "stderr was: {stderr}");
}

#[test]
fn list_mode_prints_archive_entries() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "alpha\n".repeat(100)).unwrap();
    fs::write(&b, "beta\n".repeat(100)).unwrap();

    let archive = dir.path().join("files.pz");
    let status = Command::new(pcompress_bin())
        .args([
            "-a",
            "--output",
            archive.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run pcompress -a");
    assert!(status.success(), "archive-create should exit 0");

    let output = Command::new(pcompress_bin())
        .args(["-i", archive.to_str().unwrap()])
        .output()
        .expect("failed to run pcompress -i");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("a.txt"), "list output was: {stdout}");
    assert!(stdout.contains("b.txt"), "list output was: {stdout}");
}

#[test]
fn keep_flag_leaves_source_in_place() {
    let (dir, input) = make_temp_input();
    let compressed = dir.path().join("kept.pz");
    let status = Command::new(pcompress_bin())
        .args(["-K", input.to_str().unwrap(), compressed.to_str().unwrap()])
        .status()
        .expect("failed to run pcompress -K");
    assert!(status.success());
    assert!(input.exists(), "source file must still exist after -K compress");
}
