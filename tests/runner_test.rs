#![cfg(unix)]

use folio::config::RunnerSettings;
use folio::error::Error;
use folio::renderer::MiniJinjaRenderer;
use folio::runner::{run_portfolio, Mode, Readiness, RunOptions};
use regex::Regex;
use std::net::TcpListener;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn options(mode: Mode, port: u16, server: &str, build: &str, readiness: Readiness) -> RunOptions {
    RunOptions {
        port,
        mode,
        dev_command: sh(server),
        build_command: sh(build),
        preview_command: sh(server),
        readiness,
        ready_timeout: Duration::from_secs(5),
        build_timeout: Duration::from_secs(10),
    }
}

fn process_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", pid.to_string().as_str()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[test_log::test]
fn test_dev_server_ready_when_port_opens() {
    let port = free_port();
    let project = TempDir::new().unwrap();

    // Stands in for the server coming up a moment after it was spawned.
    let server = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(listener);
    });

    let started = Instant::now();
    let opts = options(Mode::Development, port, "sleep 30", "exit 1", Readiness::PortOpen);
    let handle = run_portfolio(project.path(), &opts).unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(handle.url(), format!("http://localhost:{port}"));
    handle.stop().unwrap();
    server.join().unwrap();
}

#[test]
fn test_port_already_in_use() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let project = TempDir::new().unwrap();

    let opts =
        options(Mode::Production, port, "touch preview-started; sleep 30", "touch built", Readiness::PortOpen);
    let err = run_portfolio(project.path(), &opts).unwrap_err();

    assert!(matches!(err, Error::PortInUse { port: p } if p == port));
    assert!(!project.path().join("built").exists());
    assert!(!project.path().join("preview-started").exists());
}

#[test]
fn test_output_closed_without_match_times_out() {
    let project = TempDir::new().unwrap();
    let mut opts = options(
        Mode::Development,
        free_port(),
        "exec >/dev/null 2>&1; sleep 30",
        "exit 1",
        Readiness::OutputMatch(Regex::new("ready in").unwrap()),
    );
    opts.ready_timeout = Duration::from_millis(500);

    let err = run_portfolio(project.path(), &opts).unwrap_err();
    assert!(matches!(err, Error::ServerNotReady { .. }));
}

#[test]
fn test_ready_on_output_line() {
    let project = TempDir::new().unwrap();
    let opts = options(
        Mode::Development,
        free_port(),
        "echo 'VITE ready in 120 ms'; sleep 30",
        "exit 1",
        Readiness::OutputMatch(Regex::new("ready in").unwrap()),
    );

    let handle = run_portfolio(project.path(), &opts).unwrap();
    let pid = handle.id();
    assert!(process_alive(pid));

    drop(handle);
    assert!(!process_alive(pid));
}

#[test]
fn test_build_failure_prevents_preview() {
    let project = TempDir::new().unwrap();
    let opts = options(
        Mode::Production,
        free_port(),
        "touch preview-started; sleep 30",
        "echo 'vite build failed' >&2; exit 2",
        Readiness::PortOpen,
    );

    let err = run_portfolio(project.path(), &opts).unwrap_err();
    match err {
        Error::BuildError { code, message } => {
            assert_eq!(code, Some(2));
            assert_eq!(message, "vite build failed");
        }
        other => panic!("Expected BuildError, got {other:?}"),
    }
    assert!(!project.path().join("preview-started").exists());
}

#[test]
fn test_production_builds_then_previews() {
    let project = TempDir::new().unwrap();
    let opts = options(
        Mode::Production,
        free_port(),
        "test -d dist && echo 'preview ready'; sleep 30",
        "mkdir dist",
        Readiness::OutputMatch(Regex::new("preview ready").unwrap()),
    );

    let handle = run_portfolio(project.path(), &opts).unwrap();
    assert!(project.path().join("dist").is_dir());
    handle.stop().unwrap();
}

#[test]
fn test_server_exiting_early() {
    let project = TempDir::new().unwrap();
    let opts = options(Mode::Development, free_port(), "exit 0", "exit 1", Readiness::PortOpen);

    let err = run_portfolio(project.path(), &opts).unwrap_err();
    assert!(matches!(err, Error::ServerExited { .. }));
}

#[test]
fn test_server_not_ready_times_out() {
    let project = TempDir::new().unwrap();
    let mut opts = options(Mode::Development, free_port(), "sleep 30", "exit 1", Readiness::PortOpen);
    opts.ready_timeout = Duration::from_millis(500);

    let err = run_portfolio(project.path(), &opts).unwrap_err();
    assert!(matches!(err, Error::ServerNotReady { .. }));
}

#[test]
fn test_options_from_settings() {
    let engine = MiniJinjaRenderer::new();
    let settings = RunnerSettings { ready_pattern: Some("ready".to_string()), ..Default::default() };

    let opts = RunOptions::from_settings(&settings, &engine, Some(4173), Mode::Production).unwrap();
    assert_eq!(opts.port, 4173);
    assert_eq!(opts.preview_command, vec!["npx", "vite", "preview", "--port", "4173"]);
    assert_eq!(opts.dev_command, vec!["npm", "run", "dev", "--", "--port", "4173"]);
    assert!(matches!(opts.readiness, Readiness::OutputMatch(_)));

    let bad = RunnerSettings { ready_pattern: Some("(".to_string()), ..Default::default() };
    assert!(RunOptions::from_settings(&bad, &engine, None, Mode::Development).is_err());
}
