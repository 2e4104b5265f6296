//! Remote repository publisher.
//!
//! Deployment is a fixed sequence of stages: create the repository, push the
//! project, build and deploy it, then enable GitHub Pages. Each stage runs
//! only if the previous one succeeded and nothing is rolled back on failure.
//! The outcome names the stage that failed.

use crate::config::DeploySettings;
use crate::error::{Error, Result};
use crate::github::{CreateRepository, HostingApi, PagesSite, Repository};
use crate::process::{display_command, run_with_timeout};
use crate::vcs::{push_project, GitCli, Identity};
use log::info;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Push,
    Build,
    Deploy,
    EnableHosting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Create => "create repository",
            Stage::Push => "push",
            Stage::Build => "build",
            Stage::Deploy => "deploy",
            Stage::EnableHosting => "enable hosting",
        };
        f.write_str(name)
    }
}

/// A failed deployment stage and its cause.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: Error,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deployment failed at stage '{}': {}", self.stage, self.error)
    }
}

impl std::error::Error for StageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Everything a successful deployment produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub repository: Repository,
    pub pages_url: String,
}

pub type DeployOutcome = std::result::Result<Deployment, StageFailure>;

/// Resolved deployment parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployPlan {
    pub repository: String,
    pub description: String,
    pub private: bool,
    pub branch: String,
    pub commit_message: String,
    pub build_command: Vec<String>,
    pub deploy_command: Vec<String>,
    pub command_timeout: Duration,
}

impl DeployPlan {
    /// Builds a plan from settings already rendered against the user data.
    pub fn from_settings(settings: &DeploySettings) -> Result<Self> {
        let repository = settings
            .repository
            .clone()
            .ok_or_else(|| Error::ConfigError("repository name is not set".to_string()))?;
        Ok(Self {
            repository,
            description: settings.description.clone(),
            private: settings.private,
            branch: settings.branch.clone(),
            commit_message: settings.commit_message.clone(),
            build_command: settings.build_command.clone(),
            deploy_command: settings.deploy_command.clone(),
            command_timeout: Duration::from_secs(settings.command_timeout_secs),
        })
    }
}

/// Commit identity configured in the deploy settings, if complete.
pub fn identity_from_settings(settings: &DeploySettings) -> Option<Identity> {
    match (&settings.author_name, &settings.author_email) {
        (Some(name), Some(email)) => Some(Identity { name: name.clone(), email: email.clone() }),
        _ => None,
    }
}

pub struct Publisher<'a> {
    api: &'a dyn HostingApi,
    git: &'a GitCli,
}

impl<'a> Publisher<'a> {
    pub fn new(api: &'a dyn HostingApi, git: &'a GitCli) -> Self {
        Self { api, git }
    }

    /// Creates the remote repository.
    pub fn create(&self, plan: &DeployPlan) -> Result<Repository> {
        self.api.create_repository(&CreateRepository {
            name: plan.repository.clone(),
            description: plan.description.clone(),
            private: plan.private,
        })
    }

    /// Commits the project and pushes it to the repository's clone URL.
    pub fn push(&self, project: &Path, repository: &Repository, plan: &DeployPlan) -> Result<()> {
        push_project(self.git, project, &repository.clone_url, &plan.branch, &plan.commit_message)
    }

    /// Runs `command` in the project; any non-zero exit is a `BuildError`.
    pub fn run_step(&self, project: &Path, command: &[String], plan: &DeployPlan) -> Result<()> {
        info!("Running '{}'...", display_command(command));
        let output = run_with_timeout(command, project, &[], plan.command_timeout)?;
        if !output.success() {
            return Err(Error::BuildError {
                code: output.status.code(),
                message: output.failure_message(),
            });
        }
        Ok(())
    }

    /// Enables GitHub Pages on the plan's branch at the root path.
    pub fn enable_hosting(&self, repository: &Repository, plan: &DeployPlan) -> Result<PagesSite> {
        self.api.enable_pages(&repository.full_name, &plan.branch)
    }

    /// Runs every stage in order and reports where deployment stopped.
    pub fn deploy_portfolio(&self, project: &Path, plan: &DeployPlan) -> DeployOutcome {
        let fail = |stage: Stage| move |error: Error| StageFailure { stage, error };

        let repository = self.create(plan).map_err(fail(Stage::Create))?;
        self.push(project, &repository, plan).map_err(fail(Stage::Push))?;

        info!("Building the project...");
        self.run_step(project, &plan.build_command, plan).map_err(fail(Stage::Build))?;

        info!("Deploying to GitHub Pages...");
        self.run_step(project, &plan.deploy_command, plan).map_err(fail(Stage::Deploy))?;

        let site = self.enable_hosting(&repository, plan).map_err(fail(Stage::EnableHosting))?;
        info!("Your portfolio is live at: {}", site.html_url);

        Ok(Deployment { repository, pages_url: site.html_url })
    }
}
