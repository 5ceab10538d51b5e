use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn revisions(base: &[(&str, &str)], last: &[(&str, &str)]) -> (TempDir, TempDir) {
    let base_dir = TempDir::new().unwrap();
    let last_dir = TempDir::new().unwrap();
    for (root, files) in [(&base_dir, base), (&last_dir, last)] {
        for (path, contents) in files {
            let joined = root.path().join(path);
            fs::create_dir_all(joined.parent().unwrap()).unwrap();
            fs::write(joined, contents).unwrap();
        }
    }
    (base_dir, last_dir)
}

fn semdiff() -> Command {
    Command::cargo_bin("semdiff").unwrap()
}

#[test]
fn approve_exits_zero() {
    let (base, last) = revisions(
        &[("p/a.go", "package p\n\nfunc f() int { return 1 }\n")],
        &[("p/a.go", "package p\n\n// comment\nfunc f() int { return 1 }\n")],
    );
    semdiff()
        .args(["--base", base.path().to_str().unwrap()])
        .args(["--last", last.path().to_str().unwrap()])
        .arg("p/a.go")
        .assert()
        .success()
        .stdout(predicate::str::contains("approve"));
}

#[test]
fn reject_exits_nonzero() {
    let (base, last) = revisions(
        &[("p/a.go", "package p\nvar X = 1\n")],
        &[("p/a.go", "package p\nvar Y = 1\n")],
    );
    semdiff()
        .args(["--base", base.path().to_str().unwrap()])
        .args(["--last", last.path().to_str().unwrap()])
        .arg("p/a.go")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("reject"));
}

#[test]
fn parse_errors_exit_two() {
    let (base, last) = revisions(
        &[("p/a.go", "package p\n\nfunc f( {\n")],
        &[("p/a.go", "package p\n")],
    );
    semdiff()
        .args(["--base", base.path().to_str().unwrap()])
        .args(["--last", last.path().to_str().unwrap()])
        .arg("p/a.go")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn files_are_required() {
    semdiff().args(["--base", "/tmp", "--last", "/tmp"]).assert().failure();
}

#[test]
fn custom_bazel_basename_is_honored() {
    let (base, last) = revisions(
        &[("p/BUILD", "go_library(name=\"x\", deps=[\"//a:a\"])\n")],
        &[("p/BUILD", "go_library(name=\"x\", deps=[\"//a:a\",\"//b:b\"])\n")],
    );
    semdiff()
        .args(["--base", base.path().to_str().unwrap()])
        .args(["--last", last.path().to_str().unwrap()])
        .args(["--bazel-file", "BUILD"])
        .arg("p/BUILD")
        .assert()
        .success();
}
