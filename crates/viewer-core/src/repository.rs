//! Repository access abstraction.
//!
//! Implementations:
//! - `ProxyClient` (in `http`) - the viewer's own `/api/browse` and `/api/file` endpoints
//! - `InMemoryRepository` - For testing and demos
//!
//! Paths are rooted at the browsed repository: "" is the root, "/1.0.0/README.md" a file.

use async_trait::async_trait;
use repo_links::DirectoryEntry;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{RepoError, Result};

/// Listing and file retrieval against the remote store.
///
/// Absence and failure are distinct: `file_exists` answers `Ok(false)` for a
/// missing file and `Err` only when existence could not be determined.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// List the children of a directory.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>>;

    /// Fetch a file's content as text.
    async fn fetch_file(&self, path: &str) -> Result<String>;

    /// Probe whether a file exists.
    async fn file_exists(&self, path: &str) -> Result<bool>;

    /// Probe whether a directory exists by listing it.
    async fn directory_exists(&self, path: &str) -> Result<bool> {
        match self.list_directory(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    last_modified: Option<String>,
}

/// In-memory repository for testing
pub struct InMemoryRepository {
    files: RwLock<HashMap<String, StoredFile>>,
    dirs: RwLock<HashSet<String>>,
    /// Paths whose requests fail with a fixed error
    failures: RwLock<HashMap<String, RepoError>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        let mut dirs = HashSet::new();
        dirs.insert(String::new()); // Root directory
        Self {
            files: RwLock::new(HashMap::new()),
            dirs: RwLock::new(dirs),
            failures: RwLock::new(HashMap::new()),
        }
    }

    /// Store a file, creating its parent directories.
    pub fn add_file(&self, path: &str, content: &str) {
        let path = Self::normalize_path(path);
        self.add_dir(repo_links::path::parent_dir(&path));

        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        let last_modified = files.get(&path).and_then(|f| f.last_modified.clone());
        files.insert(
            path,
            StoredFile {
                content: content.to_string(),
                last_modified,
            },
        );
    }

    /// Create a directory and its parents.
    pub fn add_dir(&self, path: &str) {
        let mut path = Self::normalize_path(path);
        let mut dirs = self.dirs.write().unwrap_or_else(|e| e.into_inner());
        while !path.is_empty() {
            dirs.insert(path.clone());
            path = repo_links::path::parent_dir(&path).to_string();
        }
    }

    /// Set the timestamp reported in listings.
    pub fn set_last_modified(&self, path: &str, last_modified: &str) {
        let path = Self::normalize_path(path);
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = files.get_mut(&path) {
            file.last_modified = Some(last_modified.to_string());
        }
    }

    /// Remove a file, or a directory with everything below it.
    pub fn remove(&self, path: &str) {
        let path = Self::normalize_path(path);
        let prefix = format!("{}/", path);

        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.retain(|p, _| p != &path && !p.starts_with(&prefix));
        drop(files);

        let mut dirs = self.dirs.write().unwrap_or_else(|e| e.into_inner());
        dirs.retain(|p| p.is_empty() || (p != &path && !p.starts_with(&prefix)));
    }

    /// Make every request for `path` fail with `error`.
    pub fn fail_with(&self, path: &str, error: RepoError) {
        let path = Self::normalize_path(path);
        let mut failures = self.failures.write().unwrap_or_else(|e| e.into_inner());
        failures.insert(path, error);
    }

    pub fn clear_failures(&self) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// "a/b/" -> "/a/b", "/" -> ""
    fn normalize_path(path: &str) -> String {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
        match failures.get(path) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryClient for InMemoryRepository {
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let path = Self::normalize_path(path);
        self.check_failure(&path)?;

        let dirs = self.dirs.read().unwrap_or_else(|e| e.into_inner());
        if !dirs.contains(&path) {
            return Err(RepoError::NotFound { path });
        }

        let mut entries = Vec::new();
        for dir in dirs.iter() {
            if !dir.is_empty() && repo_links::path::parent_dir(dir) == path {
                entries.push(DirectoryEntry::folder(format!(
                    "/{}",
                    repo_links::path::file_name(dir)
                )));
            }
        }

        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        for (file_path, file) in files.iter() {
            if repo_links::path::parent_dir(file_path) == path {
                entries.push(DirectoryEntry {
                    uri: format!("/{}", repo_links::path::file_name(file_path)),
                    is_folder: false,
                    size: Some(file.content.len() as i64),
                    last_modified: file.last_modified.clone(),
                });
            }
        }

        // HashMap order is arbitrary; listings come back sorted like the API's
        entries.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(entries)
    }

    async fn fetch_file(&self, path: &str) -> Result<String> {
        let path = Self::normalize_path(path);
        self.check_failure(&path)?;

        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(&path)
            .map(|f| f.content.clone())
            .ok_or(RepoError::NotFound { path })
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        let path = Self::normalize_path(path);
        self.check_failure(&path)?;

        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(files.contains_key(&path))
    }
}

// Lets one repository back several sessions in tests
#[async_trait]
impl<T: RepositoryClient + ?Sized> RepositoryClient for std::sync::Arc<T> {
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        (**self).list_directory(path).await
    }

    async fn fetch_file(&self, path: &str) -> Result<String> {
        (**self).fetch_file(path).await
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        (**self).file_exists(path).await
    }

    async fn directory_exists(&self, path: &str) -> Result<bool> {
        (**self).directory_exists(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_repository_listing() {
        let repo = InMemoryRepository::new();
        repo.add_file("/1.0.0/README.md", "# Readme");
        repo.add_file("/1.0.0/lib.aar", "binary");
        repo.add_dir("/1.0.0/docs");

        let root = repo.list_directory("").await.unwrap();
        assert_eq!(root, vec![DirectoryEntry::folder("/1.0.0")]);

        let entries = repo.list_directory("/1.0.0").await.unwrap();
        let uris: Vec<_> = entries.iter().map(|e| e.uri.as_str()).collect();
        assert_eq!(uris, vec!["/README.md", "/docs", "/lib.aar"]);
        assert_eq!(entries[0].size, Some(8));
        assert!(entries[1].is_folder);
    }

    #[tokio::test]
    async fn test_in_memory_repository_existence() {
        let repo = InMemoryRepository::new();
        repo.add_file("/docs/guide.md", "guide");

        assert!(repo.file_exists("/docs/guide.md").await.unwrap());
        assert!(!repo.file_exists("/docs/missing.md").await.unwrap());
        assert!(repo.directory_exists("/docs").await.unwrap());
        assert!(!repo.directory_exists("/nope").await.unwrap());

        let err = repo.list_directory("/nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_in_memory_repository_failures() {
        let repo = InMemoryRepository::new();
        repo.add_dir("/docs");
        repo.fail_with(
            "/docs",
            RepoError::Status {
                path: "/docs".into(),
                status: 502,
            },
        );

        let err = repo.directory_exists("/docs").await.unwrap_err();
        assert_eq!(err.status(), Some(502));

        repo.clear_failures();
        assert!(repo.directory_exists("/docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_repository_remove() {
        let repo = InMemoryRepository::new();
        repo.add_file("/a/b/c.md", "c");
        repo.add_file("/a/d.md", "d");
        repo.remove("/a/b");

        let entries = repo.list_directory("/a").await.unwrap();
        assert_eq!(entries, vec![DirectoryEntry::file("/d.md").with_size(1)]);
    }
}
