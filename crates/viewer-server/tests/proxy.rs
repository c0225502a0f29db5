//! End-to-end tests for the proxy.
//!
//! Starts a fake Artifactory and the real router on ephemeral ports, then
//! drives them over HTTP, both raw and through the viewer session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use viewer_core::{
    Browser, DebugConsole, LinkOutcome, ProxyClient, RepoError, RepositoryClient, Session,
};
use viewer_server::{AppState, Upstream, router};

const REPO: &str = "libs-release/com/example/app";

/// Minimal stand-in for the Artifactory storage and download APIs.
async fn fake_artifactory(uri: Uri) -> Response {
    let storage = format!("/artifactory/api/storage/{}", REPO);
    let download = format!("/artifactory/{}", REPO);
    let path = uri.path();

    if let Some(dir) = path.strip_prefix(&storage) {
        return match dir {
            "" => Json(json!({
                "repo": "libs-release",
                "path": "/com/example/app",
                "children": [
                    {"uri": "/1.0.0", "folder": true},
                    {"uri": "/maven-metadata.xml", "folder": false}
                ]
            }))
            .into_response(),
            "/1.0.0" => Json(json!({
                "repo": "libs-release",
                "path": "/com/example/app/1.0.0",
                "children": [
                    {"uri": "/README.md", "folder": false, "size": "64", "lastModified": "2025-01-01T00:00:00.000Z"},
                    {"uri": "/app-1.0-changelog.md", "folder": false, "size": 32},
                    {"uri": "/docs", "folder": true}
                ]
            }))
            .into_response(),
            "/1.0.0/docs" => Json(json!({"children": []})).into_response(),
            "/broken" => StatusCode::BAD_GATEWAY.into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"errors": [{"status": 404, "message": "Unable to find item"}]})),
            )
                .into_response(),
        };
    }

    if let Some(file) = path.strip_prefix(&download) {
        return match file {
            "/1.0.0/README.md" => {
                "# App\n\nSee the [changelog](CHANGELOG.md) and [docs](docs/).\n".into_response()
            }
            "/1.0.0/app-1.0-changelog.md" => "# Changelog\n\n## 1.0\n".into_response(),
            "/1.0.0/forbidden.md" => StatusCode::FORBIDDEN.into_response(),
            "/1.0.0/crash.md" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        };
    }

    StatusCode::NOT_FOUND.into_response()
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct TestProxy {
    addr: SocketAddr,
    _static_dir: TempDir,
}

impl TestProxy {
    async fn start(upstream_base: &str) -> Self {
        let static_dir = TempDir::new().unwrap();
        std::fs::write(
            static_dir.path().join("index.html"),
            "<!doctype html><title>Artifactory Viewer</title>",
        )
        .unwrap();

        let upstream = Upstream::new(upstream_base, REPO, Duration::from_secs(5)).unwrap();
        let app = router(Arc::new(AppState { upstream }), static_dir.path());
        let addr = spawn(app).await;

        Self {
            addr,
            _static_dir: static_dir,
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    fn client(&self) -> ProxyClient {
        ProxyClient::new(&format!("http://{}", self.addr)).unwrap()
    }
}

async fn start() -> TestProxy {
    let upstream = spawn(Router::new().fallback(fake_artifactory)).await;
    TestProxy::start(&format!("http://{}", upstream)).await
}

#[tokio::test]
async fn browse_relays_listing() {
    let proxy = start().await;
    let entries = proxy.client().list_directory("/1.0.0").await.unwrap();

    let uris: Vec<_> = entries.iter().map(|e| e.uri.as_str()).collect();
    assert_eq!(uris, vec!["/README.md", "/app-1.0-changelog.md", "/docs"]);
    assert_eq!(entries[0].size, Some(64));
    assert!(entries[2].is_folder);

    let root = proxy.client().list_directory("").await.unwrap();
    assert_eq!(root.len(), 2);
}

#[tokio::test]
async fn browse_passes_client_errors_through() {
    let proxy = start().await;
    let response = reqwest::get(proxy.url("/api/browse?path=/nope")).await.unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["status"], 404);

    let err = proxy.client().list_directory("/nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn browse_maps_upstream_failure_to_500() {
    let proxy = start().await;
    let response = reqwest::get(proxy.url("/api/browse?path=/broken")).await.unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch directory");
    assert_eq!(body["message"], "Request failed with status code 502");
}

#[tokio::test]
async fn unreachable_upstream_is_500() {
    // Bind then drop to get a port nothing listens on
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let proxy = TestProxy::start(&format!("http://{}", closed)).await;

    let response = reqwest::get(proxy.url("/api/browse?path=")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch directory");

    let response = reqwest::get(proxy.url("/api/file?path=/a.md")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch file");

    let err = proxy.client().list_directory("").await.unwrap_err();
    assert_eq!(
        err,
        RepoError::Status {
            path: String::new(),
            status: 500
        }
    );
}

#[tokio::test]
async fn file_serves_content() {
    let proxy = start().await;
    let content = proxy
        .client()
        .fetch_file("/1.0.0/app-1.0-changelog.md")
        .await
        .unwrap();

    assert_eq!(content, "# Changelog\n\n## 1.0\n");
}

#[tokio::test]
async fn missing_file_is_reported_with_its_path() {
    let proxy = start().await;

    let response = reqwest::get(proxy.url("/api/file?path=/1.0.0/missing.md"))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "error": "File not found",
            "message": "File not found at path: /1.0.0/missing.md",
            "status": 404
        })
    );

    let response = reqwest::get(proxy.url("/api/file?path=/1.0.0/forbidden.md"))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = reqwest::get(proxy.url("/api/file?path=/1.0.0/crash.md"))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn existence_probes_distinguish_absence_from_failure() {
    let proxy = start().await;
    let client = proxy.client();

    assert!(client.file_exists("/1.0.0/README.md").await.unwrap());
    assert!(!client.file_exists("/1.0.0/missing.md").await.unwrap());
    assert_eq!(
        client.file_exists("/1.0.0/crash.md").await.unwrap_err().status(),
        Some(500)
    );
    assert!(client.directory_exists("/1.0.0/docs").await.unwrap());
    assert!(!client.directory_exists("/2.0.0").await.unwrap());
}

#[tokio::test]
async fn parent_segments_are_rejected() {
    let proxy = start().await;
    let response = reqwest::get(proxy.url("/api/file?path=/../../secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn static_front_end_and_cors() {
    let proxy = start().await;

    let response = reqwest::get(proxy.url("/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Artifactory Viewer"));

    let response = reqwest::Client::new()
        .get(proxy.url("/api/browse?path=/1.0.0"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn browsing_session_over_the_proxy() {
    let proxy = start().await;
    let browser = Browser::new(
        Arc::new(proxy.client()),
        Session::new(),
        Arc::new(DebugConsole::new()),
    );

    let view = browser.load_directory("/1.0.0").await.unwrap();
    assert_eq!(view.entries[0].uri, "/docs");

    browser.open_file("/1.0.0/README.md", "README.md").await.unwrap();

    // CHANGELOG.md does not exist; the versioned changelog is found instead
    let LinkOutcome::Opened(changelog) = browser.follow_link("CHANGELOG.md").await else {
        panic!("expected the changelog to open");
    };
    assert_eq!(changelog.path, "/1.0.0/app-1.0-changelog.md");

    let LinkOutcome::Browsed(docs) = browser.follow_link("docs/").await else {
        panic!("expected docs/ to browse");
    };
    assert_eq!(docs.path, "/1.0.0/docs");
    assert!(docs.entries.is_empty());

    browser.open_file("/1.0.0/README.md", "README.md").await.unwrap();
    let LinkOutcome::Browsed(parent) = browser.follow_link("..").await else {
        panic!("expected .. to browse the parent");
    };
    assert_eq!(parent.path, "");
    assert_eq!(parent.entries.len(), 2);

    assert!(matches!(
        browser.follow_link("https://example.com").await,
        LinkOutcome::External { .. }
    ));
}
