//! Template source loading.
//! A template is either a local directory or a git repository that is
//! cloned into a working directory before materialization.
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Represents the source location of a template.
#[derive(Debug, PartialEq)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateSource::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateSource {
    /// Classifies a template argument as a git URL or a filesystem path.
    pub fn from_string(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }

        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }

        Self::FileSystem(PathBuf::from(s))
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Returns a local directory holding the template.
    fn load(&self) -> Result<PathBuf>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    fn load(&self) -> Result<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::TemplateDoesNotExistError {
                template_dir: path.display().to_string(),
            });
        }

        Ok(path.to_path_buf())
    }
}

/// Loader for templates from git repositories.
pub struct GitLoader<'a, S: AsRef<str>> {
    prompt: &'a dyn Prompter,
    repo: S,
    work_dir: PathBuf,
    skip_overwrite_check: bool,
}

impl<'a, S: AsRef<str>> GitLoader<'a, S> {
    pub fn new(
        prompt: &'a dyn Prompter,
        repo: S,
        work_dir: impl Into<PathBuf>,
        skip_overwrite_check: bool,
    ) -> Self {
        Self { prompt, repo, work_dir: work_dir.into(), skip_overwrite_check }
    }

    /// Directory name a repository URL is cloned into.
    pub fn clone_dir_name(repo_url: &str) -> &str {
        let name = repo_url
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .unwrap_or("template")
            .trim_end_matches(".git");
        if name.is_empty() {
            "template"
        } else {
            name
        }
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<'_, S> {
    fn load(&self) -> Result<PathBuf> {
        let repo_url = self.repo.as_ref();
        let clone_path = self.work_dir.join(Self::clone_dir_name(repo_url));

        if clone_path.exists() {
            let replace = self.prompt.confirm(
                self.skip_overwrite_check,
                format!("Directory '{}' already exists. Replace it?", clone_path.display()),
            )?;
            if replace {
                fs::remove_dir_all(&clone_path)?;
            } else {
                debug!("Using existing directory '{}'.", clone_path.display());
                return Ok(clone_path);
            }
        }

        debug!("Cloning repository '{}' to '{}'.", repo_url, clone_path.display());

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            let home = std::env::var("HOME").unwrap_or_default();
            git2::Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                &Path::new(&home).join(".ssh").join("id_rsa"),
                None,
            )
        });

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, &clone_path)?;

        Ok(clone_path)
    }
}

/// Returns the template directory for the provided template argument.
pub fn load_template<S: Into<String>>(
    prompt: &dyn Prompter,
    template: S,
    work_dir: &Path,
    skip_overwrite_check: bool,
) -> Result<PathBuf> {
    let template: String = template.into();
    let template_source = TemplateSource::from_string(&template);

    log::info!("Using template from the {}", template_source);

    let loader: Box<dyn TemplateLoader + '_> = match template_source {
        TemplateSource::Git(repo) => {
            Box::new(GitLoader::new(prompt, repo, work_dir, skip_overwrite_check))
        }
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    loader.load()
}
