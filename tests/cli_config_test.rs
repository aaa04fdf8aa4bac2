use std::process::Command;
use tempfile::TempDir;

fn linedex(temp: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_linedex"));
    command
        .arg("--config")
        .arg(temp.path().join("settings.toml"))
        .env("LINEDEX_WATCH__ROOT", temp.path().join("entries"))
        .env_remove("RUST_LOG");
    command
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();

    let output = linedex(&temp_dir)
        .arg("init")
        .output()
        .expect("Failed to run init command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let content = std::fs::read_to_string(temp_dir.path().join("settings.toml")).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[watch]"));
    assert!(content.contains("[dispatch.opener]"));
    assert!(temp_dir.path().join("entries").is_dir());

    // Second init without --force refuses to overwrite
    let again = linedex(&temp_dir).arg("init").output().unwrap();
    assert!(!again.status.success());
}

#[test]
fn test_config_command_applies_env() {
    let temp_dir = TempDir::new().unwrap();

    let output = linedex(&temp_dir)
        .env("LINEDEX_DISPATCH__PREVIEW_CHARS", "12")
        .arg("config")
        .output()
        .expect("Failed to run config command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("preview_chars = 12"));
    assert!(stdout.contains("entries"));
}

#[test]
fn test_search_command() {
    let temp_dir = TempDir::new().unwrap();
    let entries = temp_dir.path().join("entries");
    std::fs::create_dir(&entries).unwrap();
    std::fs::write(
        entries.join("links.txt"),
        "Apple Pie|recipe one\nApple Tart|recipe two\nBanana|recipe three\n",
    )
    .unwrap();

    let output = linedex(&temp_dir)
        .args(["search", "apple", "tart"])
        .output()
        .expect("Failed to run search command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Apple Tart"));
}

#[test]
fn test_missing_root_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();

    let output = linedex(&temp_dir).arg("index").output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("linedex init"));
}

#[test]
fn test_readme_documents_every_command() {
    let readme = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"));

    for command in ["init", "config", "index", "search", "activate", "watch", "serve"] {
        assert!(
            readme.contains(&format!("linedex {command}")),
            "README.md does not mention `linedex {command}`"
        );
    }
}
