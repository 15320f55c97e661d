use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn neatjson() -> Command {
    Command::cargo_bin("neatjson").unwrap()
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn formats_stdin_to_stdout() {
    neatjson()
        .write_stdin(r#"{"a":1,"b":2}"#)
        .assert()
        .success()
        .stdout("{ \"a\": 1, \"b\": 2 }\n");
}

#[test]
fn formats_a_file_argument() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    write_file(&input, "[1,2,3]");

    neatjson()
        .arg(&input)
        .assert()
        .success()
        .stdout("[ 1, 2, 3 ]\n");
}

#[test]
fn writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    let output = dir.path().join("out.json");
    write_file(&input, "[1]");

    neatjson()
        .arg(&input)
        .args(["-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout("");
    assert_eq!(fs::read_to_string(&output).unwrap(), "[ 1 ]\n");
}

#[test]
fn rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.json");
    write_file(&file, r#"{"k":  [1,2]}"#);

    neatjson().arg("-i").arg(&file).assert().success().stdout("");
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "{ \"k\": [ 1, 2 ] }\n"
    );
}

#[test]
fn in_place_requires_files() {
    neatjson()
        .arg("-i")
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(contains("--in-place requires file arguments"));
}

#[test]
fn compact_minifies() {
    neatjson()
        .arg("--compact")
        .write_stdin("{ \"a\" : [ 1 , 2 ] }")
        .assert()
        .success()
        .stdout(r#"{"a":[1,2]}"#);
}

#[test]
fn bad_input_fails_with_position() {
    neatjson()
        .write_stdin("{oops}")
        .assert()
        .failure()
        .stderr(contains("neatjson:").and(contains("row=0")));
}

#[test]
fn comments_rejected_unless_enabled() {
    neatjson()
        .write_stdin("[1] // tail")
        .assert()
        .failure()
        .stderr(contains("Comments not allowed"));

    neatjson()
        .args(["--comments", "preserve"])
        .write_stdin("[1] // tail")
        .assert()
        .success()
        .stdout(contains("// tail"));
}

#[test]
fn jsonl_formats_each_line() {
    neatjson()
        .args(["--jsonl", "--compact"])
        .write_stdin("{ \"a\": 1 }\n[1, 2]\n")
        .assert()
        .success()
        .stdout("{\"a\":1}\n[1,2]\n");
}

#[test]
fn jsonl_error_policies() {
    let input = "{ \"good\": 1 }\nnot json\n[2]\n";

    neatjson()
        .args(["--jsonl", "--compact"])
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(contains("line 2"));

    neatjson()
        .args(["--jsonl", "--compact", "--jsonl-errors", "skip"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("{\"good\":1}\n[2]\n");

    neatjson()
        .args(["--jsonl", "--compact", "--jsonl-errors", "passthrough"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("{\"good\":1}\nnot json\n[2]\n");
}

#[test]
fn width_and_indent_flags_apply() {
    neatjson()
        .args(["-w", "10", "--indent", "2"])
        .write_stdin("[100, 200]")
        .assert()
        .success()
        .stdout(contains("[\n").and(contains("  ")));
}

#[test]
fn color_always_emits_ansi() {
    neatjson()
        .args(["--color", "always"])
        .write_stdin("[true]")
        .assert()
        .success()
        .stdout(contains("\u{1b}["));
}

#[test]
fn color_never_is_plain() {
    let assert = neatjson()
        .args(["--color", "never"])
        .write_stdin("[true]")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains('\u{1b}'));
}
