// tests/cli_tests.rs
// Drives the real binary; exit codes are the observable behavior here.
use assert_cmd::Command;
use hyper::{Client, StatusCode, Uri};
use predicates::prelude::*;
use std::io::Write;
use std::net::TcpListener;
use std::process::Stdio;
use std::time::{Duration, Instant};

const SETTING_VARS: &[&str] = &[
    "CONFIG",
    "WEB_ENABLE",
    "WEB_LISTEN",
    "WEB_DELAY",
    "WEB_DELAY_JITTER",
    "EXIT_AFTER",
    "EXIT_AFTER_JITTER",
    "EXIT_PERCENT",
    "EXIT_CODE",
    "SIGNALS_IGNORE",
    "CPU_LOAD_ENABLE",
    "CPU_LOAD_WORKERS",
    "RAND_SEED1",
    "RAND_SEED2",
];

fn troublemaker() -> Command {
    let mut cmd = Command::cargo_bin("troublemaker").unwrap();
    for var in SETTING_VARS {
        cmd.env_remove(var);
    }
    cmd.timeout(Duration::from_secs(20));
    cmd
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn sleep_exits_with_configured_code() {
    let started = Instant::now();
    troublemaker()
        .args(["--web.enable=false", "--exit.code", "3", "sleep", "10ms"])
        .assert()
        .code(3);
    assert!(started.elapsed() >= Duration::from_millis(10));
}

#[test]
fn sleep_with_bad_duration_is_fatal() {
    troublemaker()
        .args(["--web.enable=false", "--exit.code", "3", "sleep", "soon"])
        .assert()
        .code(1);
}

#[test]
fn unknown_subcommand_exits_one() {
    troublemaker()
        .args(["--web.enable=false", "bogus"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unknown subcommand: bogus"));
}

#[test]
fn immediate_exit_at_startup() {
    troublemaker()
        .args(["--exit.after", "1ns", "--exit.code", "5"])
        .assert()
        .code(5);
}

#[test]
fn delayed_exit_after_duration() {
    let started = Instant::now();
    troublemaker()
        .args(["--web.enable=false", "--exit.after", "200ms"])
        .assert()
        .code(1);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[test]
fn env_vars_configure_like_flags() {
    troublemaker()
        .env("EXIT_AFTER", "1ns")
        .env("EXIT_CODE", "8")
        .assert()
        .code(8);
}

#[test]
fn config_file_is_read() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[exit]\nafter = \"1ns\"\ncode = 6\n").unwrap();

    troublemaker()
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(6);
}

#[test]
fn invalid_configuration_is_fatal() {
    troublemaker()
        .args(["--exit.percent", "150"])
        .assert()
        .code(1);

    troublemaker()
        .args(["--exit.after", "whenever"])
        .assert()
        .code(1);
}

#[test]
fn bare_bool_flags_do_not_swallow_the_command() {
    troublemaker()
        .args(["--web.enable=false", "--exit.code", "4", "--signals.ignore", "sleep", "10ms"])
        .assert()
        .code(4);
}

#[test]
fn extensionless_config_file_uses_flag_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# plain flags\nexit.after 1ns\nexit.code 9").unwrap();

    troublemaker()
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(9);
}

async fn http_exit(path_and_query: &str) -> Option<i32> {
    let port = free_port();
    let mut cmd = tokio::process::Command::new(assert_cmd::cargo::cargo_bin("troublemaker"));
    for var in SETTING_VARS {
        cmd.env_remove(var);
    }
    let mut child = cmd
        .args(["--web.listen", &format!("127.0.0.1:{port}")])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let uri: Uri = format!("http://127.0.0.1:{port}{path_and_query}")
        .parse()
        .unwrap();
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    let resp = loop {
        match client.get(uri.clone()).await {
            Ok(resp) => break resp,
            Err(_) if Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(20)).await
            }
            Err(err) => panic!("server never came up: {err}"),
        }
    };
    assert_eq!(resp.status(), StatusCode::OK);

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .ok()?
        .unwrap();
    status.code()
}

#[tokio::test]
async fn http_exit_terminates_with_requested_code() {
    assert_eq!(http_exit("/exit/?code=42").await, Some(42));
}

#[tokio::test]
async fn http_exit_out_of_range_uses_default() {
    assert_eq!(http_exit("/exit/?code=200").await, Some(1));
}
