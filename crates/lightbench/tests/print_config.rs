use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn lightbench(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lightbench"));
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("LIGHTBENCH_") {
            command.env_remove(key);
        }
    }
    command
        .env("LIGHTBENCH_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn print_config_layers_cli_over_user_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lightbench.toml"),
        "[window]\nwidth = 800\nvsync = false\n\n[profiler]\nrun_for = \"30s\"\n",
    )
    .unwrap();

    let output = lightbench(dir.path())
        .args(["--print-config", "--width", "640"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("width = 640"), "stdout: {stdout}");
    assert!(stdout.contains("vsync = false"), "stdout: {stdout}");
    assert!(stdout.contains("run_for = \"30s\""), "stdout: {stdout}");
}

#[test]
fn invalid_user_file_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lightbench.toml"), "[window]\nwidth = \"wide\"\n").unwrap();

    let output = lightbench(dir.path()).arg("--print-config").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"), "stderr: {stderr}");
}

#[test]
fn zero_report_interval_is_rejected() {
    let dir = TempDir::new().unwrap();

    let output = lightbench(dir.path())
        .args(["--print-config", "--report-every", "0"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn environment_fills_flags_and_flags_win() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lightbench.toml"), "[window]\nwidth = 800\n").unwrap();

    let output = lightbench(dir.path())
        .env("LIGHTBENCH_WIDTH", "1024")
        .env("LIGHTBENCH_VSYNC", "off")
        .env("LIGHTBENCH_REPORT_EVERY", "250")
        .args(["--print-config", "--report-every", "500"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("width = 1024"), "stdout: {stdout}");
    assert!(stdout.contains("vsync = false"), "stdout: {stdout}");
    assert!(stdout.contains("report_interval = 500"), "stdout: {stdout}");
}
