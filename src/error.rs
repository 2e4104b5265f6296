//! Error handling for folio.
//! Defines the crate-wide error type and result alias used by every stage of
//! generation, local running and deployment.

use std::io;
use thiserror::Error;

/// Errors that can occur while generating, running or publishing a portfolio.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A build or deploy command exited unsuccessfully.
    #[error("Build failed (exit code {}): {message}.", exit_code(.code))]
    BuildError { code: Option<i32>, message: String },

    /// The hosting provider answered with a non-success status.
    #[error("Remote API error ({status}): {message}.")]
    RemoteApiError { status: u16, message: String },

    /// A local version-control command exited unsuccessfully.
    #[error("Command '{command}' failed: {message}.")]
    VcsCommandError { command: String, message: String },

    /// An external command did not finish within its timeout.
    #[error("Command '{command}' timed out after {seconds}s.")]
    CommandTimeout { command: String, seconds: u64 },

    /// A spawned server did not become reachable in time.
    #[error("Server at {url} was not ready after {seconds}s.")]
    ServerNotReady { url: String, seconds: u64 },

    /// A spawned server exited before it became reachable.
    #[error("Server command '{command}' exited early with status {status}.")]
    ServerExited { command: String, status: String },

    /// A stop was requested (Ctrl-C) while a command was running.
    #[error("Command '{command}' was interrupted.")]
    Interrupted { command: String },

    /// Something already listens on the port a server was meant to use.
    #[error("Port {port} is already in use.")]
    PortInUse { port: u16 },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// User data failed schema validation.
    #[error("Validation error: {0}.")]
    ValidationError(String),

    /// Represents errors that occur during template loading
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Entry files could not be patched.
    #[error("Injection error: {0}.")]
    InjectionError(String),

    /// Represents errors in processing .portfolioignore files
    #[error("Ignore file error: {0}.")]
    IgnoreError(String),

    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistError { template_dir: String },

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("HTTP error: {0}.")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler<E: std::fmt::Display>(err: E) {
    eprintln!("{err}");
    std::process::exit(1);
}
