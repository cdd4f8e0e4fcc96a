#![cfg(feature = "cli")]

use std::process::Command;

fn missing_port() -> String {
    format!(
        "/dev/portlink-missing-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    )
}

#[test]
fn ports_emits_a_json_array() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("--format")
        .arg("json")
        .arg("ports")
        .output()
        .expect("ports should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("ports should emit json");
    assert!(payload.is_array());
}

#[test]
fn send_to_missing_port_exits_open_failed() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("send")
        .arg("--port")
        .arg(missing_port())
        .arg("--message")
        .arg("hello")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(11));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"));
}

#[test]
fn watch_missing_port_exits_open_failed() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("watch")
        .arg("--port")
        .arg(missing_port())
        .output()
        .expect("watch should run");

    assert_eq!(output.status.code(), Some(11));
}

#[test]
fn unknown_charset_exits_config_invalid() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("send")
        .arg("--port")
        .arg(missing_port())
        .arg("--message")
        .arg("hello")
        .arg("--charset")
        .arg("not-a-charset")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown charset"));
}

#[test]
fn bad_sentinel_exits_config_invalid() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("send")
        .arg("--port")
        .arg(missing_port())
        .arg("--message")
        .arg("hello")
        .arg("--start-code")
        .arg("0x1FF")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sentinel"));
}

#[test]
fn bad_line_parameter_exits_config_invalid() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("send")
        .arg("--port")
        .arg(missing_port())
        .arg("--message")
        .arg("hello")
        .arg("--data-bits")
        .arg("9")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("data bits"));
}

#[test]
fn missing_required_args_exit_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_portlink"))
        .arg("send")
        .arg("--message")
        .arg("hello")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(2));
}
