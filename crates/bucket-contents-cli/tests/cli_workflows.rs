//! Integration tests for the CLI binary.

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bcontents"))
}

fn store_arg(tmp: &TempDir) -> String {
    tmp.path().join("store.json").to_string_lossy().to_string()
}

#[test]
fn put_get_round_trip() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let input = tmp.path().join("hello.txt");
    std::fs::write(&input, "hello world\n")?;

    cli()
        .args(["--store", &store, "mkdir", "bucket"])
        .assert()
        .success()
        .stdout(contains("Created bucket"));

    cli()
        .args([
            "--store",
            &store,
            "put",
            input.to_string_lossy().as_ref(),
            "bucket/hello.txt",
        ])
        .assert()
        .success()
        .stdout(contains("Saved bucket/hello.txt (file)"));

    cli()
        .args(["--store", &store, "get", "bucket/hello.txt"])
        .assert()
        .success()
        .stdout(contains("hello world"));

    Ok(())
}

#[test]
fn ls_lists_containers_and_children() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let input = tmp.path().join("f.txt");
    std::fs::write(&input, "x")?;

    cli().args(["--store", &store, "mkdir", "alpha"]).assert().success();
    cli().args(["--store", &store, "mkdir", "beta"]).assert().success();
    cli()
        .args([
            "--store",
            &store,
            "put",
            input.to_string_lossy().as_ref(),
            "alpha/dir/f.txt",
        ])
        .assert()
        .success();

    cli()
        .args(["--store", &store, "ls"])
        .assert()
        .success()
        .stdout(contains("directory\talpha"))
        .stdout(contains("directory\tbeta"));

    cli()
        .args(["--store", &store, "ls", "alpha/dir/"])
        .assert()
        .success()
        .stdout(contains("file\talpha/dir/f.txt"));

    Ok(())
}

#[test]
fn rm_and_missing_paths() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let input = tmp.path().join("f.txt");
    std::fs::write(&input, "x")?;

    cli().args(["--store", &store, "mkdir", "bucket"]).assert().success();
    cli()
        .args([
            "--store",
            &store,
            "put",
            input.to_string_lossy().as_ref(),
            "bucket/f.txt",
        ])
        .assert()
        .success();

    cli()
        .args(["--store", &store, "rm", "bucket/f.txt"])
        .assert()
        .success()
        .stdout(contains("Deleted bucket/f.txt"));

    cli()
        .args(["--store", &store, "get", "bucket/f.txt"])
        .assert()
        .failure()
        .stderr(contains("No such file: bucket/f.txt"));

    Ok(())
}

#[test]
fn mv_bridges_checkpoints() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let input = tmp.path().join("f.txt");
    std::fs::write(&input, "v1")?;

    cli().args(["--store", &store, "mkdir", "bucket"]).assert().success();
    cli()
        .args([
            "--store",
            &store,
            "put",
            input.to_string_lossy().as_ref(),
            "bucket/old.txt",
        ])
        .assert()
        .success();
    cli()
        .args(["--store", &store, "checkpoint", "create", "bucket/old.txt"])
        .assert()
        .success();

    cli()
        .args(["--store", &store, "mv", "bucket/old.txt", "bucket/new.txt"])
        .assert()
        .success()
        .stdout(contains("Moved bucket/old.txt -> bucket/new.txt"));

    // The checkpoint followed the file to its new name.
    let list = cli()
        .args(["--store", &store, "checkpoint", "list", "bucket/new.txt"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&list.get_output().stdout).to_string();
    assert_eq!(stdout.lines().count(), 1);

    cli()
        .args(["--store", &store, "checkpoint", "list", "bucket/old.txt"])
        .assert()
        .success()
        .stdout(predicates::str::is_empty());

    Ok(())
}

#[test]
fn checkpoint_create_restore_delete() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let v1 = tmp.path().join("v1.txt");
    let v2 = tmp.path().join("v2.txt");
    std::fs::write(&v1, "first version")?;
    std::fs::write(&v2, "second version")?;

    cli().args(["--store", &store, "mkdir", "bucket"]).assert().success();
    cli()
        .args([
            "--store",
            &store,
            "put",
            v1.to_string_lossy().as_ref(),
            "bucket/f.txt",
        ])
        .assert()
        .success();

    let created = cli()
        .args(["--store", &store, "checkpoint", "create", "bucket/f.txt"])
        .assert()
        .success();
    let id = String::from_utf8_lossy(&created.get_output().stdout)
        .trim()
        .to_string();

    cli()
        .args([
            "--store",
            &store,
            "put",
            v2.to_string_lossy().as_ref(),
            "bucket/f.txt",
        ])
        .assert()
        .success();

    cli()
        .args(["--store", &store, "checkpoint", "restore", &id, "bucket/f.txt"])
        .assert()
        .success()
        .stdout(contains("Restored bucket/f.txt"));

    cli()
        .args(["--store", &store, "get", "bucket/f.txt"])
        .assert()
        .success()
        .stdout(contains("first version"));

    cli()
        .args(["--store", &store, "checkpoint", "delete", &id, "bucket/f.txt"])
        .assert()
        .success();

    cli()
        .args(["--store", &store, "checkpoint", "delete", &id, "bucket/f.txt"])
        .assert()
        .failure()
        .stderr(contains("No such checkpoint"));

    Ok(())
}

#[test]
fn notebook_put_creates_a_checkpoint() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);
    let nb = tmp.path().join("nb.ipynb");
    std::fs::write(
        &nb,
        r#"{"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#,
    )?;

    cli().args(["--store", &store, "mkdir", "bucket"]).assert().success();
    cli()
        .args([
            "--store",
            &store,
            "put",
            nb.to_string_lossy().as_ref(),
            "bucket/nb.ipynb",
        ])
        .assert()
        .success()
        .stdout(contains("Saved bucket/nb.ipynb (notebook)"));

    let list = cli()
        .args(["--store", &store, "checkpoint", "list", "bucket/nb.ipynb"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&list.get_output().stdout).to_string();
    assert_eq!(stdout.lines().count(), 1);

    Ok(())
}

#[test]
fn snapshot_file_persists_between_invocations() -> TestResult {
    let tmp = TempDir::new()?;
    let store = store_arg(&tmp);

    cli().args(["--store", &store, "mkdir", "bucket"]).assert().success();
    assert!(tmp.path().join("store.json").exists());

    // A fresh process sees the container created by the previous one.
    cli()
        .args(["--store", &store, "ls"])
        .assert()
        .success()
        .stdout(contains("directory\tbucket"));

    Ok(())
}
