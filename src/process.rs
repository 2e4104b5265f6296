//! External command execution.
//! Commands run with the project directory as working directory; their
//! output is forwarded line by line to the log and, for blocking commands,
//! captured for error reporting. Blocking commands are bounded by a timeout.

use crate::constants::CHILD_LOG_TARGET;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period between asking a process group to stop and killing it.
const TERMINATE_GRACE: Duration = Duration::from_secs(3);

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Human-readable form of a command line.
pub fn display_command(command: &[String]) -> String {
    command.join(" ")
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Best available failure text: stderr, then stdout, then the status.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        if !stderr.is_empty() {
            stderr.to_string()
        } else if !stdout.is_empty() {
            stdout.to_string()
        } else {
            format!("exited with {}", self.status)
        }
    }
}

/// Signals when an output line matches a pattern.
pub struct LineWatch {
    pub pattern: Regex,
    pub notify: Sender<()>,
}

fn build_command(command: &[String], cwd: &Path, envs: &[(String, String)]) -> Result<Command> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::ConfigError("empty command".to_string()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .envs(envs.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group, so the whole tree (npm -> vite) can be stopped together.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    Ok(cmd)
}

fn forward_lines<R: Read + Send + 'static>(
    reader: R,
    is_stderr: bool,
    capture: bool,
    watch: Option<LineWatch>,
) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut captured = String::new();
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            if is_stderr {
                warn!(target: CHILD_LOG_TARGET, "{line}");
            } else {
                info!(target: CHILD_LOG_TARGET, "{line}");
            }
            if let Some(watch) = &watch {
                if watch.pattern.is_match(&line) {
                    let _ = watch.notify.send(());
                }
            }
            if capture {
                captured.push_str(&line);
                captured.push('\n');
            }
        }
        captured
    })
}

/// Spawns `command` without waiting for it.
///
/// Output is forwarded to the log but not captured. When `watch` is given,
/// both streams are matched against its pattern.
pub fn spawn_streaming(
    command: &[String],
    cwd: &Path,
    watch: Option<LineWatch>,
) -> Result<(Child, Vec<JoinHandle<String>>)> {
    debug!("Spawning '{}' in {}", display_command(command), cwd.display());
    let mut child = build_command(command, cwd, &[])?.spawn()?;

    let (stdout_watch, stderr_watch) = match watch {
        Some(w) => {
            let twin = LineWatch { pattern: w.pattern.clone(), notify: w.notify.clone() };
            (Some(w), Some(twin))
        }
        None => (None, None),
    };

    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(stdout, false, false, stdout_watch));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(stderr, true, false, stderr_watch));
    }
    Ok((child, readers))
}

/// Asks every running command to stop at its next poll.
///
/// Installed as the Ctrl-C handler: children live in their own process
/// group, so the terminal's SIGINT never reaches them directly.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// Runs `command` to completion, failing with `CommandTimeout` if it or
/// anything still holding its output is alive after `timeout`.
///
/// A non-zero exit is not an error here; callers decide what it means.
/// A stop request ends the command early with `Interrupted`.
pub fn run_with_timeout(
    command: &[String],
    cwd: &Path,
    envs: &[(String, String)],
    timeout: Duration,
) -> Result<CommandOutput> {
    if stop_requested() {
        return Err(Error::Interrupted { command: display_command(command) });
    }

    debug!("Running '{}' in {}", display_command(command), cwd.display());
    let mut child = build_command(command, cwd, envs)?.spawn()?;

    let stdout = child.stdout.take().map(|s| forward_lines(s, false, true, None));
    let stderr = child.stderr.take().map(|s| forward_lines(s, true, true, None));

    let deadline = Instant::now() + timeout;
    let mut exited = None;
    let status = loop {
        if exited.is_none() {
            exited = child.try_wait()?;
        }
        // Background processes may keep the pipes open after the leader exits.
        let drained = [&stdout, &stderr]
            .into_iter()
            .all(|reader| reader.as_ref().map_or(true, JoinHandle::is_finished));
        if let (Some(status), true) = (exited, drained) {
            break status;
        }

        let interrupted = stop_requested();
        if interrupted || Instant::now() >= deadline {
            terminate(&mut child)?;
            join_readers(stdout.into_iter().chain(stderr));
            let command = display_command(command);
            return Err(if interrupted {
                Error::Interrupted { command }
            } else {
                Error::CommandTimeout { command, seconds: timeout.as_secs() }
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(CommandOutput {
        status,
        stdout: stdout.map(join_reader).unwrap_or_default(),
        stderr: stderr.map(join_reader).unwrap_or_default(),
    })
}

fn join_reader(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Waits for output forwarding threads to drain.
pub fn join_readers<I: IntoIterator<Item = JoinHandle<String>>>(handles: I) {
    for handle in handles {
        let _ = handle.join();
    }
}

#[cfg(unix)]
fn signal_group(leader: u32, signal: &str) -> bool {
    let group = format!("-{leader}");
    Command::new("kill")
        .args([signal, "--", group.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn signal_group(_leader: u32, _signal: &str) -> bool {
    false
}

/// Stops `child` and its process group, returning the child's exit status.
///
/// On unix a running group is sent SIGTERM first and given a short grace
/// period. Whatever is left of the group afterwards is killed, including
/// members that outlived the leader.
pub fn terminate(child: &mut Child) -> Result<ExitStatus> {
    if child.try_wait()?.is_none() && signal_group(child.id(), "-TERM") {
        let started = Instant::now();
        while started.elapsed() < TERMINATE_GRACE && child.try_wait()?.is_none() {
            thread::sleep(POLL_INTERVAL);
        }
    }
    signal_group(child.id(), "-KILL");

    match child.kill() {
        Ok(()) => {}
        // Already exited between the checks above.
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(e.into()),
    }
    Ok(child.wait()?)
}
