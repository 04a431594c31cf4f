use std::{
  path::Path,
  process::{Command, Output},
};

use pngmeta::read_metadata;

use super::{fixture, scratch_copy};

fn pngmeta(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_pngmeta")).args(args).env_remove("RUST_LOG").output().unwrap()
}

fn arg(path: &Path) -> &str {
  path.to_str().unwrap()
}

fn stdout(out: &Output) -> String {
  String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
  String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_cli_no_arguments() {
  let out = pngmeta(&[]);
  assert_eq!(out.status.code(), Some(1));
  assert!(!stderr(&out).is_empty());
  assert!(stdout(&out).is_empty());
}

#[test]
fn test_cli_help_is_success() {
  let out = pngmeta(&["--help"]);
  assert_eq!(out.status.code(), Some(0));
  assert!(stdout(&out).contains("pngmeta"));
}

#[test]
fn test_cli_read_mode() {
  let out = pngmeta(&[arg(&fixture("rgb8_text.png"))]);
  assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
  assert_eq!(
    stdout(&out),
    "Metadata from PNG file:\nKey: Author, Value: Ren\u{e9}\nKey: Title, Value: Hello\n"
  );

  let out = pngmeta(&[arg(&fixture("grey16_plain.png"))]);
  assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
  assert_eq!(stdout(&out), "No metadata found in the PNG file.\n");
}

#[test]
fn test_cli_write_mode() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "rgb8_text.png");
  let out = pngmeta(&[arg(&path), "Title=Cat", "Note=a=b"]);
  assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
  assert_eq!(stdout(&out), "Metadata successfully written to the PNG file.\n");
  let metadata = read_metadata(&path).unwrap();
  assert_eq!(metadata["Title"], "Cat");
  assert_eq!(metadata["Note"], "a=b");
  assert_eq!(metadata["Author"], "Ren\u{e9}");
}

#[test]
fn test_cli_bad_assignment_leaves_file_alone() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "rgb8_text.png");
  let before = std::fs::read(&path).unwrap();
  let out = pngmeta(&[arg(&path), "Title=Cat", "novalueseparator"]);
  assert_eq!(out.status.code(), Some(1));
  assert_eq!(stderr(&out), "Invalid metadata format: novalueseparator\n");
  assert!(stdout(&out).is_empty());
  assert_eq!(std::fs::read(&path).unwrap(), before);

  // arguments are checked before the path is even opened
  let missing = dir.path().join("missing.png");
  let out = pngmeta(&[arg(&missing), "novalueseparator"]);
  assert_eq!(out.status.code(), Some(1));
  assert_eq!(stderr(&out), "Invalid metadata format: novalueseparator\n");
  assert!(!missing.exists());
}

#[test]
fn test_cli_not_a_png() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("plain.txt");
  std::fs::write(&path, b"just some text").unwrap();
  for out in [pngmeta(&[arg(&path)]), pngmeta(&[arg(&path), "k=v"])] {
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("Error:"), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
  }
  assert_eq!(std::fs::read(&path).unwrap(), b"just some text");

  let out = pngmeta(&[arg(&dir.path().join("missing.png"))]);
  assert_eq!(out.status.code(), Some(1));
  assert!(stderr(&out).starts_with("Error:"));
}
