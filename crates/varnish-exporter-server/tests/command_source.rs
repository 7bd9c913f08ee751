#![cfg(unix)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use varnish_exporter_server::config::CommandSpec;
use varnish_exporter_server::source::{CommandSource, TextSource};

fn sh(script: &str, timeout: Duration) -> CommandSource {
    CommandSource::new(CommandSpec {
        program: "sh".into(),
        args: vec!["-c".into(), script.into()],
        timeout,
    })
}

#[tokio::test]
async fn returns_stdout_on_success() {
    let src = sh("printf '{\"version\":\"1\"}'", Duration::from_secs(5));
    assert_eq!(src.name(), "sh");
    assert_eq!(src.read().await.unwrap(), "{\"version\":\"1\"}");
}

#[tokio::test]
async fn non_zero_exit_reports_stderr() {
    let src = sh("echo 'Could not get hold of varnishd' >&2; exit 1", Duration::from_secs(5));
    let err = src.read().await.expect_err("must fail");
    assert_eq!(err.code().as_str(), "SOURCE_FAILED");
    assert!(err.to_string().contains("Could not get hold of varnishd"));
}

#[tokio::test]
async fn non_zero_exit_falls_back_to_stdout() {
    let src = sh("echo 'Unknown request.'; exit 101", Duration::from_secs(5));
    let err = src.read().await.expect_err("must fail");
    assert!(err.to_string().contains("Unknown request."));
}

#[tokio::test]
async fn slow_command_times_out() {
    let src = sh("sleep 10", Duration::from_millis(200));
    let started = Instant::now();
    let err = src.read().await.expect_err("must time out");
    assert_eq!(err.code().as_str(), "SOURCE_TIMEOUT");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn missing_program_is_source_failure() {
    let src = CommandSource::new(CommandSpec {
        program: "/nonexistent/varnishstat".into(),
        args: vec![],
        timeout: Duration::from_secs(1),
    });
    let err = src.read().await.expect_err("must fail");
    assert_eq!(err.code().as_str(), "SOURCE_FAILED");
}
