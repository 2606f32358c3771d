use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "city-builder-bin-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn run(save: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_city-builder"))
        .arg("--save")
        .arg(save)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to invoke city-builder binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "city-builder"])
        .status()
        .expect("failed to invoke cargo check for city-builder CLI binary");

    assert!(status.success(), "cargo check --bin city-builder should succeed");
}

#[test]
fn placements_persist_between_invocations() {
    let dir = scratch_dir("persist");
    let save = dir.join("saves").join("city.json");

    let created = run(&save, &["new"]);
    assert!(created.status.success());
    assert!(stdout(&created).contains("Started a new city."));

    let placed = run(&save, &["place", "SOLAR_PANEL", "0", "0"]);
    assert!(placed.status.success());
    assert!(stdout(&placed).contains("Solar Panel placed."));

    let map = run(&save, &["map"]);
    assert!(
        stdout(&map).starts_with('S'),
        "the solar panel should be drawn in the upper-left corner",
    );

    let status = run(&save, &["status"]);
    assert!(stdout(&status).contains("Credits:    9500"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rejected_commands_are_reported_without_failing() {
    let dir = scratch_dir("rejected");
    let save = dir.join("city.json");

    let output = run(&save, &["remove", "3", "3"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("No building at that position (3, 3)."));
    assert!(save.exists(), "the unchanged city is still saved");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_config_exits_with_error() {
    let dir = scratch_dir("config");
    let save = dir.join("city.json");
    let config = dir.join("missing.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_city-builder"))
        .arg("--save")
        .arg(&save)
        .arg("--config")
        .arg(&config)
        .arg("status")
        .output()
        .expect("failed to invoke city-builder binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read config file"));
    let _ = fs::remove_dir_all(&dir);
}
