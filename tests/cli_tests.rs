//! CLI integration tests.
//!
//! Uses `assert_cmd` to spawn the `llfront` binary and check exit codes and
//! output for each subcommand.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn llfront() -> Command {
    let mut cmd = cargo_bin_cmd!("llfront");
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write source");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_lists_subcommands() {
    llfront()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens"))
        .stdout(predicate::str::contains("grammar"))
        .stdout(predicate::str::contains("compile"));
}

#[test]
fn test_tokens_text() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_source(&dir, "a.c", "int a = 0;\n");

    llfront()
        .args(["tokens", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("TYPE"))
        .stdout(predicate::str::contains("ASSIGNOP"));
}

#[test]
fn test_tokens_json() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_source(&dir, "a.c", "int a = 0; @");

    let output = llfront()
        .args(["--json", "tokens", &file])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["tokens"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["tokens"][1]["value"], "a");
    assert_eq!(json["diagnostics"][0]["kind"], "lexical");
}

#[test]
fn test_grammar_report() {
    llfront()
        .arg("grammar")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sum -> Term Sum'"))
        .stdout(predicate::str::contains("FIRST / FOLLOW"))
        .stdout(predicate::str::contains("synch"))
        .stdout(predicate::str::contains("conflict").not());
}

#[test]
fn test_custom_grammar_conflicts() {
    let dir = TempDir::new().expect("tempdir");
    let grammar = write_source(&dir, "g.txt", "S -> A\nS -> B\nA -> x\nB -> x\n");

    let output = llfront()
        .args(["--json", "--grammar", &grammar, "grammar"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["conflicts"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["table"]["S"]["x"], 0);
}

#[test]
fn test_grammar_shows_each_rewriting_stage() {
    let dir = TempDir::new().expect("tempdir");
    let grammar = write_source(
        &dir,
        "expr.txt",
        "E -> E PLUS T\nE -> T\nT -> ID LP RP\nT -> ID\n",
    );

    llfront()
        .args(["--grammar", &grammar, "grammar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Left-factored:\n      E -> E PLUS T\n"))
        .stdout(predicate::str::contains("Normalized:"))
        .stdout(predicate::str::contains("E' -> PLUS T E'"));

    let output = llfront()
        .args(["--json", "--grammar", &grammar, "grammar"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let factored = json["left_factored"].as_array().expect("left_factored");
    let normalized = json["normalized"].as_array().expect("normalized");
    assert_eq!(factored[0], "E -> E PLUS T");
    assert!(factored.iter().any(|r| r == "TID -> LP RP"));
    assert!(!normalized.iter().any(|r| r == "E -> E PLUS T"));
    assert!(normalized.iter().any(|r| r == "E -> T E'"));
}

#[test]
fn test_empty_grammar_fails() {
    let dir = TempDir::new().expect("tempdir");
    let grammar = write_source(&dir, "empty.txt", "\n");

    llfront()
        .args(["--grammar", &grammar, "grammar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("grammar has no productions"));
}

#[test]
fn test_missing_file_fails() {
    llfront()
        .args(["compile", "does/not/exist.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("can't read source file"));
}

#[test]
fn test_parse_tree() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_source(&dir, "a.c", "int a;");

    llfront()
        .args(["parse", &file])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Program(1)"))
        .stdout(predicate::str::contains("    VariableDeclaration(1)"))
        .stdout(predicate::str::contains("ID(1) a"));
}

#[test]
fn test_compile_demo() {
    assert!(Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/loops.c").exists());

    llfront()
        .args(["compile", "demos/loops.c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grid: array(2, array(3, int))"))
        .stdout(predicate::str::contains("(jnz, "))
        .stdout(predicate::str::contains("Diagnostics").not());
}

#[test]
fn test_compile_reports_semantic_errors() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_source(&dir, "bad.c", "int a;\nint a;\nb = 1;\n");

    llfront()
        .args(["compile", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Semantic error at Line 2: redeclaration of 'a'",
        ))
        .stdout(predicate::str::contains(
            "Semantic error at Line 3: undeclared identifier 'b'",
        ));
}
