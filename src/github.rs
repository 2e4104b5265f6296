//! Hosting provider API: repository creation and GitHub Pages enablement.

use crate::error::{Error, Result};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of a repository creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
}

/// The fields of a created repository this crate uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/name`, used to address the repository in later calls.
    pub full_name: String,
    pub clone_url: String,
    pub html_url: String,
}

/// A GitHub Pages site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagesSite {
    pub html_url: String,
}

#[derive(Debug, Serialize)]
struct PagesSource<'a> {
    branch: &'a str,
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct EnablePages<'a> {
    source: PagesSource<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Operations the publisher needs from the hosting provider.
pub trait HostingApi {
    fn create_repository(&self, request: &CreateRepository) -> Result<Repository>;

    /// Enables static hosting for `full_name` from the root of `branch`.
    fn enable_pages(&self, full_name: &str, branch: &str) -> Result<PagesSite>;
}

/// GitHub REST API client.
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::ConfigError(format!("invalid API url '{base_url}': {e}")))?;
        let http = Client::builder().user_agent(USER_AGENT).timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base_url, token: token.into() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn send<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json()?)
        } else {
            Err(api_error(status.as_u16(), response))
        }
    }
}

fn api_error(status: u16, response: Response) -> Error {
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or_else(|_| if text.is_empty() { format!("HTTP {status}") } else { text });
    Error::RemoteApiError { status, message }
}

impl HostingApi for GitHubClient {
    fn create_repository(&self, request: &CreateRepository) -> Result<Repository> {
        info!("Creating repository: {}...", request.name);
        let url = self.endpoint("user/repos");
        debug!("POST {}", url);

        let repository: Repository = self.send(
            self.http
                .post(url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, "application/vnd.github.v3+json")
                .json(request),
        )?;

        info!("Repository created successfully: {}", repository.html_url);
        Ok(repository)
    }

    fn enable_pages(&self, full_name: &str, branch: &str) -> Result<PagesSite> {
        info!("Enabling GitHub Pages for {}...", full_name);
        let url = self.endpoint(&format!("repos/{full_name}/pages"));
        debug!("POST {}", url);

        let site: PagesSite = self.send(
            self.http
                .post(url)
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .header(ACCEPT, "application/vnd.github+json")
                .json(&EnablePages { source: PagesSource { branch, path: "/" } }),
        )?;

        info!("GitHub Pages enabled at {}", site.html_url);
        Ok(site)
    }
}
