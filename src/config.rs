//! Project configuration.
//! An optional portfolio.json / portfolio.yml / portfolio.yaml at the project
//! root overrides runner and deployment defaults. Deployment strings may
//! reference user data fields through MiniJinja expressions.

use crate::constants::{
    CONFIG_FILES, DEFAULT_API_URL, DEFAULT_BRANCH, DEFAULT_COMMAND_TIMEOUT_SECS,
    DEFAULT_COMMIT_MESSAGE, DEFAULT_DESCRIPTION, DEFAULT_PORT, DEFAULT_READY_TIMEOUT_SECS,
    DEFAULT_TOKEN_ENV,
};
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use crate::user_data::UserData;
use cruet::Inflector;
use log::debug;
use serde::Deserialize;
use std::path::Path;

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub runner: RunnerSettings,
    pub deploy: DeploySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerSettings {
    pub port: u16,
    pub dev_command: Vec<String>,
    pub build_command: Vec<String>,
    pub preview_command: Vec<String>,
    pub ready_timeout_secs: u64,
    pub build_timeout_secs: u64,
    /// Regex matched against server output; when unset the port is probed.
    pub ready_pattern: Option<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            dev_command: command(&["npm", "run", "dev", "--", "--port", "{{ port }}"]),
            build_command: command(&["npm", "run", "build"]),
            preview_command: command(&["npx", "vite", "preview", "--port", "{{ port }}"]),
            ready_timeout_secs: DEFAULT_READY_TIMEOUT_SECS,
            build_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            ready_pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploySettings {
    /// Repository name; defaults to the kebab-cased user name.
    pub repository: Option<String>,
    pub description: String,
    pub private: bool,
    pub branch: String,
    pub commit_message: String,
    pub build_command: Vec<String>,
    pub deploy_command: Vec<String>,
    pub command_timeout_secs: u64,
    pub api_url: String,
    /// Environment variable holding the access token.
    pub token_env: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            repository: None,
            description: DEFAULT_DESCRIPTION.to_string(),
            private: false,
            branch: DEFAULT_BRANCH.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            build_command: command(&["npm", "run", "build"]),
            deploy_command: command(&["npm", "run", "deploy"]),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            api_url: DEFAULT_API_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            author_name: None,
            author_email: None,
        }
    }
}

impl DeploySettings {
    /// Renders the user-facing strings against `user_data`.
    ///
    /// The repository name falls back to the kebab-cased `name` field.
    pub fn render(&self, engine: &dyn TemplateRenderer, user_data: &UserData) -> Result<Self> {
        let context = user_data.to_value();
        let repository = match &self.repository {
            Some(template) => engine.render(template, &context)?,
            None => user_data
                .name()
                .map(|name| name.to_kebab_case())
                .ok_or_else(|| {
                    Error::ConfigError(
                        "no repository name configured and user data has no name".to_string(),
                    )
                })?,
        };
        if repository.trim().is_empty() {
            return Err(Error::ConfigError("repository name is empty".to_string()));
        }

        Ok(Self {
            repository: Some(repository),
            description: engine.render(&self.description, &context)?,
            commit_message: engine.render(&self.commit_message, &context)?,
            ..self.clone()
        })
    }
}

/// Reads the first configuration file found in `project_dir`.
///
/// # Returns
/// * `Ok(None)` when no configuration file exists
pub fn load_config<P: AsRef<Path>>(project_dir: P) -> Result<Option<String>> {
    for file in CONFIG_FILES {
        let config_path = project_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(Some(std::fs::read_to_string(&config_path)?));
        }
    }
    Ok(None)
}

/// Parses configuration content, trying JSON first and falling back to YAML.
pub fn parse_config(content: &str) -> Result<Config> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Loads the project configuration, using defaults when none exists.
pub fn get_config<P: AsRef<Path>>(project_dir: P) -> Result<Config> {
    match load_config(project_dir)? {
        Some(content) => parse_config(&content),
        None => {
            debug!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Reads the access token from the environment variable named `token_env`.
pub fn access_token(token_env: &str) -> Result<String> {
    match std::env::var(token_env) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(Error::ConfigError(format!("environment variable {token_env} is not set"))),
    }
}
