//! End-to-end tests of the `tgdl` binary that need no network.

use std::process::{Command, Output};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn tgdl(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tgdl"))
        .args(args)
        .env("TGDL_CONFIG", home.path().join("config.toml"))
        .env("TGDL_SESSION", home.path().join("tgdl.session"))
        .env("TGDL_LANG", "en")
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let out = tgdl(&home, &["--help"]);
    assert!(out.status.success());
    let text = stdout(&out);
    for cmd in ["login", "dialogs", "files", "download", "config"] {
        assert!(predicate::str::contains(cmd).eval(&text), "help lacks {cmd}");
    }
}

#[test]
fn test_dialogs_without_session_asks_for_login() {
    let home = TempDir::new().unwrap();
    let out = tgdl(&home, &["dialogs"]);
    assert!(!out.status.success());
    assert!(predicate::str::contains("tgdl login").eval(&stderr(&out)));
    home.child("tgdl.session").assert(predicate::path::missing());
}

#[test]
fn test_download_without_session_writes_nothing() {
    let home = TempDir::new().unwrap();
    let target = home.child("downloads");
    let out = tgdl(
        &home,
        &[
            "download",
            "Some Channel",
            "--output",
            target.path().to_str().unwrap(),
        ],
    );
    assert!(!out.status.success());
    assert!(predicate::str::contains("log in").eval(&stderr(&out)));
    target.assert(predicate::path::missing());
}

#[test]
fn test_bad_category_is_rejected() {
    let home = TempDir::new().unwrap();
    let out = tgdl(&home, &["files", "News", "--category", "spreadsheets"]);
    assert!(!out.status.success());
    assert!(predicate::str::contains("spreadsheets").eval(&stderr(&out)));
}

#[test]
fn test_config_sets_download_dir() {
    let home = TempDir::new().unwrap();
    let target = home.child("saved");

    let out = tgdl(
        &home,
        &["config", "--download-dir", target.path().to_str().unwrap()],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let config = home.child("config.toml");
    config.assert(predicate::path::is_file());
    config.assert(predicate::str::contains("download_dir"));
    config.assert(predicate::str::contains("saved"));

    let out = tgdl(&home, &["config", "--json"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["logged_in"], false);
    assert_eq!(
        json["download_dir"].as_str().unwrap(),
        target.path().to_str().unwrap()
    );
}

#[test]
fn test_config_masks_api_hash() {
    let home = TempDir::new().unwrap();
    home.child("config.toml")
        .write_str("api_id = 12345\napi_hash = \"0123456789abcdef\"\n")
        .unwrap();

    let out = tgdl(&home, &["config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("12345"));
    assert!(!text.contains("0123456789abcdef"));
    assert!(text.contains("01************ef"));
}

#[test]
fn test_completions_generate() {
    let home = TempDir::new().unwrap();
    let out = tgdl(&home, &["completions", "bash"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("tgdl"));
}
