use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_aerofs");
    Command::new(exe)
        .args(args)
        .env_remove("AEROFS_ACCESS_TOKEN")
        .output()
        .expect("aerofs should execute")
}

#[test]
fn help_lists_primary_commands() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["ls", "rename", "mv", "rm", "share", "put"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

#[test]
fn missing_token_is_rejected() {
    let output = run_cli(&["ls", "root"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--token"));
}
