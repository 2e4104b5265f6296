//! folio generates portfolio websites from a template project and user
//! profile data, runs them locally, and publishes them to GitHub Pages.

/// Command-line interface module for the folio binary
pub mod cli;

/// Project configuration (portfolio.json, portfolio.yml, portfolio.yaml)
pub mod config;

/// Fixed names, extensions and defaults
pub mod constants;

/// Error types and handling
pub mod error;

/// Generation phase orchestration
pub mod generator;

/// GitHub REST API client
pub mod github;

/// File and directory ignore patterns
/// Processes .portfolioignore files to exclude specific paths
pub mod ignore;

/// Entry-point injection of user data
pub mod injector;

/// Template loading from local paths or git repositories
pub mod loader;

/// Logger setup for the binary
pub mod logger;

/// Template tree copying
pub mod materializer;

/// External command execution with timeouts and log forwarding
pub mod process;

/// User confirmation prompts
pub mod prompt;

/// Deployment stages and orchestration
pub mod publisher;

/// MiniJinja rendering of configurable strings
pub mod renderer;

/// Local development and preview servers
pub mod runner;

/// Placeholder substitution pass
pub mod substitution;

/// User profile data
pub mod user_data;

/// Git command line wrapper
pub mod vcs;
