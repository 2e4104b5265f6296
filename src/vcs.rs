//! Local version control through the `git` command line.
//! Every step is a blocking command with a timeout; a non-zero exit is a
//! `VcsCommandError` carrying the command's error output.

use crate::constants::REMOTE_NAME;
use crate::error::{Error, Result};
use crate::process::{display_command, run_with_timeout, CommandOutput};
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

/// Commit identity passed to git through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Runs git commands inside a project directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    timeout: Duration,
    identity: Option<Identity>,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self { program: "git".to_string(), timeout, identity: None }
    }

    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    fn envs(&self) -> Vec<(String, String)> {
        match &self.identity {
            Some(id) => vec![
                ("GIT_AUTHOR_NAME".to_string(), id.name.clone()),
                ("GIT_AUTHOR_EMAIL".to_string(), id.email.clone()),
                ("GIT_COMMITTER_NAME".to_string(), id.name.clone()),
                ("GIT_COMMITTER_EMAIL".to_string(), id.email.clone()),
            ],
            None => Vec::new(),
        }
    }

    fn output(&self, project: &Path, args: &[&str]) -> Result<(Vec<String>, CommandOutput)> {
        let mut command = vec![self.program.clone()];
        command.extend(args.iter().map(|a| a.to_string()));
        let output = run_with_timeout(&command, project, &self.envs(), self.timeout)?;
        Ok((command, output))
    }

    /// Runs `git <args>` and returns its stdout.
    pub fn run(&self, project: &Path, args: &[&str]) -> Result<String> {
        let (command, output) = self.output(project, args)?;
        if !output.success() {
            return Err(Error::VcsCommandError {
                command: display_command(&command),
                message: output.failure_message(),
            });
        }
        Ok(output.stdout)
    }

    pub fn is_repository(&self, project: &Path) -> bool {
        project.join(".git").exists()
    }

    pub fn init(&self, project: &Path) -> Result<()> {
        self.run(project, &["init"]).map(drop)
    }

    pub fn add_all(&self, project: &Path) -> Result<()> {
        self.run(project, &["add", "."]).map(drop)
    }

    pub fn commit(&self, project: &Path, message: &str) -> Result<()> {
        self.run(project, &["commit", "-m", message]).map(drop)
    }

    /// URL of `remote`, or `None` when the probe fails for any reason.
    pub fn remote_url(&self, project: &Path, remote: &str) -> Option<String> {
        match self.run(project, &["remote", "get-url", remote]) {
            Ok(url) => Some(url.trim().to_string()),
            Err(e) => {
                debug!("Treating remote '{}' as absent: {}", remote, e);
                None
            }
        }
    }

    /// Points `remote` at `url`, adding the remote if it does not exist.
    pub fn set_remote(&self, project: &Path, remote: &str, url: &str) -> Result<()> {
        if self.remote_url(project, remote).is_some() {
            info!("Updating remote repository URL...");
            self.run(project, &["remote", "set-url", remote, url]).map(drop)
        } else {
            info!("Adding remote repository...");
            self.run(project, &["remote", "add", remote, url]).map(drop)
        }
    }

    pub fn rename_branch(&self, project: &Path, branch: &str) -> Result<()> {
        self.run(project, &["branch", "-M", branch]).map(drop)
    }

    pub fn push_upstream(&self, project: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run(project, &["push", "-u", remote, branch]).map(drop)
    }
}

/// Commits everything in `project` and pushes it to `remote_url` on `branch`.
///
/// Initializes the repository when needed. Stops at the first failing
/// command; earlier steps are not undone.
pub fn push_project(
    git: &GitCli,
    project: &Path,
    remote_url: &str,
    branch: &str,
    commit_message: &str,
) -> Result<()> {
    if !git.is_repository(project) {
        info!("Initializing Git...");
        git.init(project)?;
    }

    info!("Adding files to Git...");
    git.add_all(project)?;

    info!("Committing changes...");
    git.commit(project, commit_message)?;

    git.set_remote(project, REMOTE_NAME, remote_url)?;

    info!("Ensuring branch {} exists...", branch);
    git.rename_branch(project, branch)?;

    info!("Pushing code to branch: {}...", branch);
    git.push_upstream(project, REMOTE_NAME, branch)?;

    info!("Code pushed successfully!");
    Ok(())
}
