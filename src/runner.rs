//! Local runner: starts a development server or a production build plus
//! preview server for a generated project.
//!
//! The server is returned as an owned [`ServerHandle`]. Readiness is
//! detected by polling the port (or matching an output line) with a bounded
//! timeout instead of sleeping for a fixed delay.

use crate::config::RunnerSettings;
use crate::error::{Error, Result};
use crate::process::{
    display_command, join_readers, run_with_timeout, spawn_streaming, stop_requested, terminate,
    LineWatch,
};
use crate::renderer::{render_command, TemplateRenderer};
use log::{debug, info};
use regex::Regex;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const PROBE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

/// How the runner decides that a spawned server is reachable.
#[derive(Debug, Clone)]
pub enum Readiness {
    /// A TCP connection to the port succeeds.
    PortOpen,
    /// A line of server output matches the pattern.
    OutputMatch(Regex),
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub port: u16,
    pub mode: Mode,
    pub dev_command: Vec<String>,
    pub build_command: Vec<String>,
    pub preview_command: Vec<String>,
    pub readiness: Readiness,
    pub ready_timeout: Duration,
    pub build_timeout: Duration,
}

impl RunOptions {
    /// Builds run options from settings, rendering `{{ port }}` in commands.
    pub fn from_settings(
        settings: &RunnerSettings,
        engine: &dyn TemplateRenderer,
        port: Option<u16>,
        mode: Mode,
    ) -> Result<Self> {
        let port = port.unwrap_or(settings.port);
        let context = serde_json::json!({ "port": port });
        let readiness = match &settings.ready_pattern {
            Some(pattern) => Readiness::OutputMatch(Regex::new(pattern).map_err(|e| {
                Error::ConfigError(format!("invalid ready_pattern '{pattern}': {e}"))
            })?),
            None => Readiness::PortOpen,
        };

        Ok(Self {
            port,
            mode,
            dev_command: render_command(engine, &settings.dev_command, &context)?,
            build_command: render_command(engine, &settings.build_command, &context)?,
            preview_command: render_command(engine, &settings.preview_command, &context)?,
            readiness,
            ready_timeout: Duration::from_secs(settings.ready_timeout_secs),
            build_timeout: Duration::from_secs(settings.build_timeout_secs),
        })
    }

    pub fn url(&self) -> String {
        local_url(self.port)
    }
}

pub fn local_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// A running server process owned by the caller.
///
/// Dropping the handle stops the server.
pub struct ServerHandle {
    child: Child,
    readers: Vec<JoinHandle<String>>,
    url: String,
    command: String,
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("pid", &self.child.id())
            .field("url", &self.url)
            .field("command", &self.command)
            .finish()
    }
}

impl ServerHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Returns the exit status if the server has already stopped.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Blocks until the server exits on its own.
    pub fn wait(mut self) -> Result<ExitStatus> {
        let status = self.child.wait()?;
        join_readers(self.readers.drain(..));
        Ok(status)
    }

    /// Stops the server and waits for it to exit.
    pub fn stop(mut self) -> Result<ExitStatus> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<ExitStatus> {
        debug!("Stopping '{}' (pid {})", self.command, self.child.id());
        let status = terminate(&mut self.child)?;
        join_readers(self.readers.drain(..));
        Ok(status)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            if let Err(e) = self.shutdown() {
                log::warn!("Failed to stop '{}': {}", self.command, e);
            }
        }
    }
}

/// Starts the generated project at `project_root`.
///
/// In development mode the dev server is spawned directly. In production mode
/// the build command must finish successfully first, otherwise `BuildError`
/// is returned and no preview server is started. `PortInUse` is returned
/// before anything runs if the port already accepts connections.
pub fn run_portfolio(project_root: &Path, options: &RunOptions) -> Result<ServerHandle> {
    // A taken port would look ready while the server moves to another one.
    if port_open(options.port) {
        return Err(Error::PortInUse { port: options.port });
    }

    let server_command = match options.mode {
        Mode::Development => {
            info!("Starting the development server...");
            &options.dev_command
        }
        Mode::Production => {
            info!("Building the project for production...");
            build_project(project_root, &options.build_command, options.build_timeout)?;
            info!("Previewing the production build...");
            &options.preview_command
        }
    };

    let handle = start_server(project_root, server_command, options)?;
    info!("Server is running at: {}", handle.url());
    Ok(handle)
}

/// Runs a build command, mapping a non-zero exit to `BuildError`.
pub fn build_project(project_root: &Path, command: &[String], timeout: Duration) -> Result<()> {
    let output = run_with_timeout(command, project_root, &[], timeout)?;
    if !output.success() {
        return Err(Error::BuildError {
            code: output.status.code(),
            message: output.failure_message(),
        });
    }
    Ok(())
}

fn start_server(project_root: &Path, command: &[String], options: &RunOptions) -> Result<ServerHandle> {
    let (watch, matched) = match &options.readiness {
        Readiness::OutputMatch(pattern) => {
            let (tx, rx) = mpsc::channel();
            (Some(LineWatch { pattern: pattern.clone(), notify: tx }), Some(rx))
        }
        Readiness::PortOpen => (None, None),
    };

    let (child, readers) = spawn_streaming(command, project_root, watch)?;
    let mut handle =
        ServerHandle { child, readers, url: options.url(), command: display_command(command) };

    // On failure the handle is dropped, which stops the process.
    wait_until_ready(&mut handle, options.port, matched.as_ref(), options.ready_timeout)?;
    Ok(handle)
}

fn wait_until_ready(
    handle: &mut ServerHandle,
    port: u16,
    matched: Option<&Receiver<()>>,
    timeout: Duration,
) -> Result<()> {
    let started = Instant::now();
    loop {
        if let Some(status) = handle.try_wait()? {
            return Err(Error::ServerExited {
                command: handle.command.clone(),
                status: status.to_string(),
            });
        }

        if stop_requested() {
            return Err(Error::Interrupted { command: handle.command.clone() });
        }

        let ready = match matched {
            Some(rx) => match rx.recv_timeout(PROBE_INTERVAL) {
                Ok(()) => true,
                Err(RecvTimeoutError::Timeout) => false,
                // Output closed without a match; keep waiting on the process.
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(PROBE_INTERVAL);
                    false
                }
            },
            None => {
                let open = port_open(port);
                if !open {
                    thread::sleep(PROBE_INTERVAL);
                }
                open
            }
        };
        if ready {
            return Ok(());
        }

        if started.elapsed() >= timeout {
            return Err(Error::ServerNotReady {
                url: handle.url.clone(),
                seconds: timeout.as_secs(),
            });
        }
    }
}

/// Checks whether anything accepts connections on `localhost:port`.
pub fn port_open(port: u16) -> bool {
    let Ok(addrs) = ("localhost", port).to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, PROBE_INTERVAL).is_ok())
}

