//! Repository client backed by the viewer's proxy endpoints.

use async_trait::async_trait;
use repo_links::DirectoryEntry;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{RepoError, Result};
use crate::listing::decode_listing;
use crate::repository::RepositoryClient;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to `/api/browse` and `/api/file` on a running proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    client: reqwest::Client,
}

impl ProxyClient {
    /// Create a client for the proxy at `base_url` (e.g. "http://localhost:3000").
    pub fn new(base_url: &str) -> reqwest::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn browse_url(&self, path: &str) -> String {
        format!("{}/api/browse?path={}", self.base_url, urlencoding::encode(path))
    }

    /// URL serving the raw file, also used for downloads.
    pub fn file_url(&self, path: &str) -> String {
        format!("{}/api/file?path={}", self.base_url, urlencoding::encode(path))
    }

    async fn get(&self, path: &str, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| RepoError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

fn status_error(path: &str, status: StatusCode) -> RepoError {
    if status == StatusCode::NOT_FOUND {
        RepoError::NotFound {
            path: path.to_string(),
        }
    } else {
        RepoError::Status {
            path: path.to_string(),
            status: status.as_u16(),
        }
    }
}

fn body_error(path: &str, e: reqwest::Error) -> RepoError {
    RepoError::Transport {
        path: path.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl RepositoryClient for ProxyClient {
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let response = self.get(path, &self.browse_url(path)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(path, status));
        }

        let body = response.bytes().await.map_err(|e| body_error(path, e))?;
        decode_listing(path, &body)
    }

    async fn fetch_file(&self, path: &str) -> Result<String> {
        let response = self.get(path, &self.file_url(path)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(path, status));
        }

        response.text().await.map_err(|e| body_error(path, e))
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        let response = self.get(path, &self.file_url(path)).await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(status_error(path, status))
        }
    }
}
