use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn writes_default_config_into_new_dir() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("finetune");

    Command::cargo_bin("finetune_init")
        .expect("binary exists")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    let text = fs::read_to_string(dir.join("config.json")).unwrap();
    assert!(text.starts_with("{\n    \"template\": \"fcn\",\n    \"backend\": \"LMDB\","));
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["val_batches"], 19);
    assert_eq!(json["snapshot_interval"], 1000);
    assert_eq!(json["device"], "GPU");
}

#[test]
fn applies_toml_overrides() {
    let tmp = TempDir::new().unwrap();
    let overrides = tmp.path().join("cpu.toml");
    fs::write(&overrides, "device = \"CPU\"\nmax_iter = 300\n").unwrap();
    let dir = tmp.path().join("finetune");

    Command::cargo_bin("finetune_init")
        .expect("binary exists")
        .arg(&dir)
        .arg("--config")
        .arg(&overrides)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("config.json")).unwrap()).unwrap();
    assert_eq!(json["device"], "CPU");
    assert_eq!(json["max_iter"], 300);
    assert_eq!(json["template"], "fcn");
}

#[test]
fn refuses_existing_dir() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("finetune");
    fs::create_dir(&dir).unwrap();

    Command::cargo_bin("finetune_init")
        .expect("binary exists")
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to create"));
    assert!(!dir.join("config.json").exists());
}

#[test]
fn dot_writes_into_current_dir() {
    let tmp = TempDir::new().unwrap();

    Command::cargo_bin("finetune_init")
        .expect("binary exists")
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(tmp.path().join("config.json").is_file());
}
