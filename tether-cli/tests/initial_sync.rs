use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use filetime::FileTime;
use predicates::prelude::*;
use tempfile::TempDir;

fn tether(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tether").expect("tether binary");
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(30));
    cmd
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn age(path: &Path, secs: u64) {
    let then = SystemTime::now() - Duration::from_secs(secs);
    filetime::set_file_mtime(path, FileTime::from_system_time(then)).expect("set mtime");
}

#[test]
fn once_with_yes_pushes_missing_files() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("a/b.txt"), "hello");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .args(["--once", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initial sync"))
        .stdout(predicate::str::contains("Push 1 files from"))
        .stdout(predicate::str::contains("b.txt -> "));

    assert_eq!(
        fs::read_to_string(dst.path().join("a/b.txt")).expect("copied"),
        "hello"
    );
}

#[test]
fn typed_yes_on_stdin_confirms_the_push() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("a/b.txt"), "hello");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .arg("--once")
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Y/n]?"));

    assert!(dst.path().join("a/b.txt").is_file());
}

#[test]
fn declined_prompt_copies_nothing() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("a/b.txt"), "hello");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .arg("--once")
        .write_stdin("n\n")
        .assert()
        .success();

    assert!(!dst.path().join("a").exists());
}

#[test]
fn up_to_date_destination_is_not_prompted() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("f.txt"), "old");
    age(&src.path().join("f.txt"), 3600);
    write(&dst.path().join("f.txt"), "old");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .arg("--once")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Y/n]").not());
}

#[test]
fn directory_onto_file_is_rejected_up_front() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    let file = dst.path().join("plain.txt");
    write(&file, "x");

    tether(home.path())
        .arg(src.path())
        .arg(&file)
        .args(["--once", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "is file, cannot synchronize dir to file",
        ));
}

#[test]
fn create_flag_makes_the_destination_root() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("f.txt"), "data");
    let target = dst.path().join("new/nested");

    tether(home.path())
        .arg(src.path())
        .arg(&target)
        .args(["--create", "--once", "--yes"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(target.join("f.txt")).expect("copied"),
        "data"
    );
}

#[test]
fn create_flag_reports_an_impossible_destination() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    let blocker = dst.path().join("file");
    write(&blocker, "x");

    tether(home.path())
        .arg(src.path())
        .arg(blocker.join("below"))
        .args(["--create", "--once", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create"));
}

#[test]
fn missing_source_is_reported() {
    let home = TempDir::new().expect("home");
    let dst = TempDir::new().expect("dst");
    let missing = dst.path().join("nowhere");

    tether(home.path())
        .arg(&missing)
        .arg(dst.path())
        .args(["--once", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a file not a dir"));
}

#[test]
fn settings_file_excludes_apply() {
    let home = TempDir::new().expect("home");
    write(
        &home.path().join(".tether/config.yaml"),
        "exclude:\n  - \"*.log\"\n",
    );
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("keep.txt"), "k");
    write(&src.path().join("debug.log"), "d");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .args(["--once", "--yes"])
        .assert()
        .success();

    assert!(dst.path().join("keep.txt").is_file());
    assert!(!dst.path().join("debug.log").exists());
}

#[test]
fn cli_include_limits_the_push() {
    let home = TempDir::new().expect("home");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    write(&src.path().join("src/main.rs"), "fn main() {}");
    write(&src.path().join("README.md"), "readme");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .args(["-i", "*.rs", "--once", "--yes"])
        .assert()
        .success();

    assert!(dst.path().join("src/main.rs").is_file());
    assert!(!dst.path().join("README.md").exists());
}

#[test]
fn malformed_settings_file_is_an_error() {
    let home = TempDir::new().expect("home");
    write(&home.path().join(".tether/config.yaml"), "debounce_ms: [nope\n");
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");

    tether(home.path())
        .arg(src.path())
        .arg(dst.path())
        .args(["--once", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load settings"));
}
