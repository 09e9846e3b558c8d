//! End-to-end tests for the `forall diff` command.
//!
//! These tests build real git repositories, so they are skipped when `git`
//! is not installed.

mod common;
use common::prelude::*;

#[test]
fn test_diff_reports_insertions_and_deletions() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_git_checkout("lib/a", "git@host:a.git", "master")
        .with_git_checkout("lib/keep", "git@host:keep.git", "master")
        .with_manifest("\"lib/keep\" \"git@host:keep.git\"\n\"lib/b\" \"git@host:b.git\"\n");

    fixture
        .command()
        .arg("diff")
        .assert()
        .success()
        .stdout("+ lib/b git@host:b.git master\n- lib/a git@host:a.git master\n");
}

#[test]
fn test_diff_ignores_changed_remote() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_git_checkout("lib/a", "git@host:a.git", "dev")
        .with_manifest("\"lib/a\" \"git@host:moved.git\"\n");

    fixture
        .command()
        .arg("diff")
        .assert()
        .success()
        .stdout("No differences\n");
}

#[test]
fn test_diff_json() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_git_checkout("lib/a", "git@host:a.git", "master")
        .with_manifest("\"dev\"\n\"lib/b\" \"git@host:b.git\"\n");

    let output = fixture
        .command()
        .args(["diff", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(value["insertions"][0]["rel"], "lib/b");
    assert_eq!(value["insertions"][0]["branch"], "dev");
    assert_eq!(value["deletions"][0]["rel"], "lib/a");
}

#[test]
fn test_diff_missing_manifest_deletes_everything() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new().with_git_checkout("lib/a", "git@host:a.git", "master");

    fixture
        .command()
        .arg("diff")
        .assert()
        .success()
        .stdout("- lib/a git@host:a.git master\n")
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_diff_custom_manifest() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_git_checkout("lib/a", "git@host:a.git", "master")
        .with_file("repos.txt", "\"lib/a\" \"git@host:a.git\"\n");

    fixture
        .command()
        .args(["--manifest", "repos.txt", "diff"])
        .assert()
        .success()
        .stdout("No differences\n");
}

#[test]
fn test_diff_fails_without_origin() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new().with_checkout("broken");

    fixture
        .command()
        .arg("diff")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Version control error"));
}
