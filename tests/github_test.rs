use folio::error::Error;
use folio::github::{CreateRepository, GitHubClient, HostingApi};
use httpmock::prelude::*;
use serde_json::json;

fn request() -> CreateRepository {
    CreateRepository {
        name: "ada".to_string(),
        description: "This is my portfolio website".to_string(),
        private: false,
    }
}

#[test]
fn test_create_repository() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/user/repos")
            .header("authorization", "token secret")
            .json_body(json!({
                "name": "ada",
                "description": "This is my portfolio website",
                "private": false
            }));
        then.status(201).json_body(json!({
            "name": "ada",
            "full_name": "octo/ada",
            "clone_url": "https://github.com/octo/ada.git",
            "html_url": "https://github.com/octo/ada",
            "id": 1
        }));
    });

    let client = GitHubClient::new(&server.base_url(), "secret").unwrap();
    let repo = client.create_repository(&request()).unwrap();

    mock.assert();
    assert_eq!(repo.full_name, "octo/ada");
    assert_eq!(repo.clone_url, "https://github.com/octo/ada.git");
}

#[test]
fn test_create_repository_name_taken() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/user/repos");
        then.status(422).json_body(json!({
            "message": "Repository creation failed.",
            "errors": [{ "field": "name", "message": "name already exists on this account" }]
        }));
    });

    let client = GitHubClient::new(&server.base_url(), "secret").unwrap();
    match client.create_repository(&request()).unwrap_err() {
        Error::RemoteApiError { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Repository creation failed.");
        }
        other => panic!("Expected RemoteApiError, got {other:?}"),
    }
}

#[test]
fn test_error_without_json_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/user/repos");
        then.status(502).body("bad gateway");
    });

    let client = GitHubClient::new(&server.base_url(), "secret").unwrap();
    match client.create_repository(&request()).unwrap_err() {
        Error::RemoteApiError { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("Expected RemoteApiError, got {other:?}"),
    }
}

#[test]
fn test_enable_pages() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/octo/ada/pages")
            .header("authorization", "Bearer secret")
            .json_body(json!({ "source": { "branch": "main", "path": "/" } }));
        then.status(201).json_body(json!({
            "url": "https://api.github.com/repos/octo/ada/pages",
            "html_url": "https://octo.github.io/ada/"
        }));
    });

    let client = GitHubClient::new(&server.base_url(), "secret").unwrap();
    let site = client.enable_pages("octo/ada", "main").unwrap();

    mock.assert();
    assert_eq!(site.html_url, "https://octo.github.io/ada/");
}

#[test]
fn test_invalid_base_url() {
    assert!(matches!(GitHubClient::new("not a url", "t"), Err(Error::ConfigError(_))));
}
