//! Client for the upstream Artifactory instance.

use reqwest::header::ACCEPT;
use std::time::Duration;

use crate::config::Config;

/// Builds upstream URLs for one repository folder and fetches them.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
    repository: String,
}

impl Upstream {
    pub fn new(base_url: &str, repository: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            repository: repository.trim_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            &config.upstream_base_url,
            &config.repository,
            config.request_timeout(),
        )
    }

    /// Storage API URL listing `path`.
    pub fn storage_url(&self, path: &str) -> String {
        format!(
            "{}/artifactory/api/storage/{}{}",
            self.base_url, self.repository, path
        )
    }

    /// URL serving the raw content of `path`.
    pub fn file_url(&self, path: &str) -> String {
        format!("{}/artifactory/{}{}", self.base_url, self.repository, path)
    }

    pub async fn browse(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        let url = self.storage_url(path);
        tracing::debug!("Fetching: {}", url);
        self.client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
    }

    pub async fn file(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        let url = self.file_url(path);
        tracing::debug!("Fetching file: {}", url);
        self.client.get(url).send().await
    }

    /// Human-readable location being browsed, for the startup banner.
    pub fn describe(&self) -> String {
        self.storage_url("")
    }
}

/// Validate a requested repository path.
///
/// Paths are "" (root) or start with `/`; a missing leading slash is added.
/// `..` segments are refused so requests cannot leave the repository folder.
pub fn normalize_request_path(path: &str) -> Option<String> {
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    if path.is_empty() || path.starts_with('/') {
        Some(path.to_string())
    } else {
        Some(format!("/{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_artifactory_layout() {
        let upstream = Upstream::new(
            "https://artifactory.example.com/",
            "/libs-release/com/example/",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            upstream.storage_url("/1.0.0"),
            "https://artifactory.example.com/artifactory/api/storage/libs-release/com/example/1.0.0"
        );
        assert_eq!(
            upstream.file_url("/1.0.0/README.md"),
            "https://artifactory.example.com/artifactory/libs-release/com/example/1.0.0/README.md"
        );
        assert_eq!(
            upstream.storage_url(""),
            "https://artifactory.example.com/artifactory/api/storage/libs-release/com/example"
        );
    }

    #[test]
    fn request_paths_are_normalized() {
        assert_eq!(normalize_request_path(""), Some(String::new()));
        assert_eq!(normalize_request_path("/1.0.0"), Some("/1.0.0".into()));
        assert_eq!(normalize_request_path("1.0.0/a.md"), Some("/1.0.0/a.md".into()));
        assert_eq!(normalize_request_path("/../secret"), None);
        assert_eq!(normalize_request_path("/a/../../b"), None);
    }
}
