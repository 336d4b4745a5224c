//! Integration tests for the `somfly` CLI binary.
//!
//! Offline commands run as-is; controller-bound commands run against a
//! small blocking UAI+ stand-in on loopback.
#![allow(clippy::unwrap_used)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `somfly` binary with env isolation.
///
/// Clears all `SOMFLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn somfly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("somfly");
    cmd.env("HOME", "/tmp/somfly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/somfly-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("SOMFLY_PROFILE")
        .env_remove("SOMFLY_HOST")
        .env_remove("SOMFLY_PORT")
        .env_remove("SOMFLY_USERNAME")
        .env_remove("SOMFLY_PASSWORD")
        .env_remove("SOMFLY_TIMEOUT")
        .env_remove("SOMFLY_OUTPUT")
        .env_remove("SOMFLY_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Stand-in controller ─────────────────────────────────────────────

const KITCHEN: &str = "132A01";

/// One shade whose device position (0 = open) is shared across sessions.
struct FakeController {
    port: u16,
    device_position: Arc<Mutex<i64>>,
}

impl FakeController {
    fn start(device_position: i64) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let device_position = Arc::new(Mutex::new(device_position));

        let shared = Arc::clone(&device_position);
        thread::spawn(move || {
            for socket in listener.incoming() {
                let Ok(socket) = socket else { break };
                let shared = Arc::clone(&shared);
                thread::spawn(move || serve(socket, &shared));
            }
        });
        Self {
            port,
            device_position,
        }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = somfly_cmd();
        cmd.args(["--host", "127.0.0.1", "--port", &self.port.to_string()]);
        cmd
    }
}

fn serve(socket: TcpStream, position: &Mutex<i64>) {
    let mut write = socket.try_clone().unwrap();
    let mut lines = BufReader::new(socket).lines();

    let _ = write.write_all(b"User:");
    if !matches!(lines.next(), Some(Ok(_))) {
        return;
    }
    let _ = write.write_all(b"Password:");
    let Some(Ok(password)) = lines.next() else {
        return;
    };
    if password.trim_end() != "Password 1" {
        return;
    }
    let _ = write.write_all(b"Connected:\r\n");

    for line in lines {
        let Ok(line) = line else { return };
        let Ok(request) = serde_json::from_str::<Value>(line.trim_end()) else {
            continue;
        };
        let target = request["params"][0]["targetID"].as_str().unwrap_or_default();
        let known = target == KITCHEN;
        let result = match request["method"].as_str().unwrap_or_default() {
            "sdn.status.ping" => json!([KITCHEN]),
            "sdn.status.info" if known => json!({"name": "Kitchen", "type": "ST30"}),
            "sdn.status.position" if known => json!(*position.lock().unwrap()),
            "sdn.move.to" if known => {
                *position.lock().unwrap() = request["params"][1]["position"].as_i64().unwrap();
                json!(true)
            }
            "sdn.move.up" if known => {
                *position.lock().unwrap() = 0;
                json!(true)
            }
            "sdn.move.down" if known => {
                *position.lock().unwrap() = 100;
                json!(true)
            }
            "sdn.move.stop" if known => json!(true),
            _ => json!(false),
        };
        let reply = format!("{}\r\n", json!({"id": request["id"], "result": result}));
        if write.write_all(reply.as_bytes()).is_err() {
            return;
        }
    }
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = somfly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    somfly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("UAI+")
            .and(predicate::str::contains("shades"))
            .and(predicate::str::contains("node-id"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    somfly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("somfly"));
}

#[test]
fn test_shades_help_lists_moves() {
    somfly_cmd().args(["shades", "--help"]).assert().success().stdout(
        predicate::str::contains("move-to")
            .and(predicate::str::contains("open"))
            .and(predicate::str::contains("stop")),
    );
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_node_id_converts_compact_to_dotted() {
    somfly_cmd()
        .args(["node-id", "132A01"])
        .assert()
        .success()
        .stdout(predicate::str::diff("13.2A.01\n"));
}

#[test]
fn test_node_id_converts_dotted_to_compact() {
    somfly_cmd()
        .args(["node-id", "13.2A.01"])
        .assert()
        .success()
        .stdout(predicate::str::diff("132A01\n"));
}

#[test]
fn test_node_id_json_has_both_forms() {
    let output = somfly_cmd()
        .args(["node-id", "1329fb", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({"compact": "1329fb", "dotted": "13.29.fb"}));
}

#[test]
fn test_config_output_default_applies_without_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("somfly");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[defaults]\noutput = \"json-compact\"\n",
    )
    .unwrap();

    let output = somfly_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["node-id", "132A01"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({"compact": "132A01", "dotted": "13.2A.01"}));

    // An explicit flag still wins.
    somfly_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["node-id", "132A01", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("13.2A.01\n"));
}

#[test]
fn test_node_id_rejects_garbage() {
    let output = somfly_cmd().args(["node-id", "kitchen"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("neither"));
}

#[test]
fn test_config_path() {
    somfly_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file() {
    somfly_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]").and(predicate::str::contains("timeout = 10")));
}

#[test]
fn test_config_show_masks_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("somfly");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[profiles.home]\nhost = \"10.1.1.50\"\npassword = \"hunter2\"\n",
    )
    .unwrap();

    somfly_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_completions_bash() {
    somfly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("somfly"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_controller_command_without_host_is_usage_error() {
    let output = somfly_cmd().arg("ping").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No controller configured"));
}

#[test]
fn test_move_to_out_of_range_is_rejected_by_parser() {
    somfly_cmd()
        .args(["--host", "127.0.0.1", "shades", "move-to", "132A01", "150"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unknown_profile_is_not_found() {
    let output = somfly_cmd()
        .args(["--profile", "attic", "ping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("attic"));
}

// ── Against a controller ────────────────────────────────────────────

#[test]
fn test_ping() {
    let controller = FakeController::start(0);
    controller
        .cmd()
        .arg("ping")
        .assert()
        .success()
        .stdout(predicate::str::contains("is alive"));
}

#[test]
fn test_shades_list_reports_host_positions() {
    let controller = FakeController::start(30);
    let output = controller
        .cmd()
        .args(["shades", "list", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let shades: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        shades,
        json!([{
            "node_id": "132A01",
            "dotted_id": "13.2A.01",
            "name": "Kitchen",
            "kind": "ST30",
            "position": 70
        }])
    );
}

#[test]
fn test_shades_list_plain_prints_ids() {
    let controller = FakeController::start(0);
    controller
        .cmd()
        .args(["shades", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("13.2A.01\n"));
}

#[test]
fn test_move_to_then_position() {
    let controller = FakeController::start(0);
    controller
        .cmd()
        .args(["shades", "move-to", "13.2A.01", "25"])
        .assert()
        .success();
    assert_eq!(*controller.device_position.lock().unwrap(), 75);

    controller
        .cmd()
        .args(["shades", "position", "132A01", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("25\n"));
}

#[test]
fn test_move_to_raw_scales_between_limits() {
    let controller = FakeController::start(0);
    controller
        .cmd()
        .args([
            "shades",
            "move-to",
            "132A01",
            "--raw",
            "1750",
            "--limits-up",
            "1000",
            "--limits-down",
            "2000",
        ])
        .assert()
        .success();
    assert_eq!(*controller.device_position.lock().unwrap(), 75);
}

#[test]
fn test_open_and_close() {
    let controller = FakeController::start(50);
    controller.cmd().args(["shades", "close", "132A01"]).assert().success();
    assert_eq!(*controller.device_position.lock().unwrap(), 100);

    controller.cmd().args(["shades", "up", "132A01"]).assert().success();
    assert_eq!(*controller.device_position.lock().unwrap(), 0);
}

#[test]
fn test_unknown_shade_info_is_not_found() {
    let controller = FakeController::start(0);
    let output = controller
        .cmd()
        .args(["shades", "info", "AB.CD.EF"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[test]
fn test_rejected_move_exit_code() {
    let controller = FakeController::start(0);
    let output = controller
        .cmd()
        .args(["shades", "stop", "ABCDEF"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[test]
fn test_wrong_password_is_auth_error() {
    let controller = FakeController::start(0);
    let output = controller
        .cmd()
        .args(["--password", "nope", "ping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[test]
fn test_refused_connection_exit_code() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let output = somfly_cmd()
        .args(["--host", "127.0.0.1", "--port", &port.to_string(), "ping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
