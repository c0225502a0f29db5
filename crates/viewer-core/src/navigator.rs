//! Turns a clicked document link into a navigation action.
//!
//! The href is resolved against the open document, probed for existence,
//! and on a miss matched fuzzily against the document's directory. Every
//! internal link ends in exactly one action: open a file, open a
//! directory, or a link error explaining why neither was possible.

use repo_links::fuzzy::{self, base_name_of, search_pattern};
use repo_links::path::{self, file_name, file_stem, is_file_like, resolve, strip_fragment};
use serde::Serialize;
use std::sync::Arc;

use crate::log::LogSink;
use crate::repository::RepositoryClient;
use crate::session::{CurrentFile, Session};

pub const FILE_NOT_FOUND: &str =
    "File not found. The link may be broken or the file may not exist in this repository.";
pub const DIRECTORY_NOT_FOUND: &str =
    "Directory not found. The link may be broken or the directory may not exist.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NavigationAction {
    OpenFile { path: String, name: String },
    OpenDirectory { path: String },
    LinkError { href: String, reason: String },
}

pub struct LinkNavigator {
    client: Arc<dyn RepositoryClient>,
    session: Session,
    log: Arc<dyn LogSink>,
}

impl LinkNavigator {
    pub fn new(client: Arc<dyn RepositoryClient>, session: Session, log: Arc<dyn LogSink>) -> Self {
        Self {
            client,
            session,
            log,
        }
    }

    /// Resolve an internal href. External and anchor links must be filtered
    /// out beforehand (see [`repo_links::href::classify`]).
    pub async fn navigate(&self, href: &str) -> NavigationAction {
        self.log.info(&format!("Processing link: {}", href));

        let current = self.session.current_file();
        // With no open document, links resolve against the browsed directory
        let base = match &current {
            Some(file) => file.path.clone(),
            None => format!("{}/", self.session.current_path()),
        };
        let target = strip_fragment(href);
        let resolved = resolve(&base, target);
        self.log.info(&format!("Resolved path: {}", resolved));

        if is_file_like(href) {
            self.navigate_to_file(href, target, resolved, current.as_ref())
                .await
        } else {
            self.navigate_to_directory(href, resolved).await
        }
    }

    async fn navigate_to_file(
        &self,
        href: &str,
        target: &str,
        resolved: String,
        current: Option<&CurrentFile>,
    ) -> NavigationAction {
        // Absence is the common case here and is not worth a log line
        match self.client.file_exists(&resolved).await {
            Ok(true) => {
                self.log
                    .success(&format!("Found file at exact path: {}", resolved));
                return NavigationAction::OpenFile {
                    name: file_name(target).to_string(),
                    path: resolved,
                };
            }
            Ok(false) => {}
            Err(e) => {
                self.log.warning(
                    &format!("File check failed: {}", resolved),
                    &[("error", e.to_string())],
                );
            }
        }

        let stem = file_stem(target);
        self.log.info(&format!(
            "Exact path not found, searching for similar files matching: {}",
            stem
        ));

        if let Some((path, name)) = self.find_similar_file(&stem, current).await {
            self.log
                .success(&format!("Found similar file: {} at {}", name, path));
            return NavigationAction::OpenFile { path, name };
        }

        self.log
            .warning(&format!("Could not find file for link: {}", href), &[]);
        NavigationAction::LinkError {
            href: href.to_string(),
            reason: FILE_NOT_FOUND.to_string(),
        }
    }

    async fn navigate_to_directory(&self, href: &str, resolved: String) -> NavigationAction {
        // `..` and `docs/..` name directories too; the API rejects dot segments
        let resolved = path::normalize(&resolved);

        match self.client.directory_exists(&resolved).await {
            Ok(true) => NavigationAction::OpenDirectory { path: resolved },
            Ok(false) => NavigationAction::LinkError {
                href: href.to_string(),
                reason: DIRECTORY_NOT_FOUND.to_string(),
            },
            Err(e) => {
                self.log.warning(
                    &format!("Directory check failed: {}", resolved),
                    &[("error", e.to_string())],
                );
                NavigationAction::LinkError {
                    href: href.to_string(),
                    reason: DIRECTORY_NOT_FOUND.to_string(),
                }
            }
        }
    }

    /// Search the open document's directory for a file resembling `stem`.
    /// Returns the matched path and display name.
    async fn find_similar_file(
        &self,
        stem: &str,
        current: Option<&CurrentFile>,
    ) -> Option<(String, String)> {
        let (dir, base_name) = match current {
            Some(file) => (file.dir().to_string(), base_name_of(&file.name)),
            None => (self.session.current_path(), String::new()),
        };
        self.log.info(&format!("Searching in directory: {}", dir));

        let entries = match self.client.list_directory(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                let status = e.status().map(|s| s.to_string()).unwrap_or_default();
                self.log.warning(
                    &format!("Failed to browse directory: {}", dir),
                    &[("status", status), ("error", e.to_string())],
                );
                return None;
            }
        };
        self.log
            .info(&format!("Found {} items in directory", entries.len()));

        let pattern = search_pattern(stem);
        if pattern != stem {
            self.log
                .info(&format!("Mapped \"{}\" to pattern \"{}\"", stem, pattern));
        }

        let ranked = fuzzy::rank(&entries, stem, &base_name);
        self.log.info(&format!(
            "Found {} matching files for pattern \"{}\"",
            ranked.len(),
            pattern
        ));
        for candidate in &ranked {
            self.log.info(&format!(
                "File: {} - Score: {}",
                candidate.entry.name(),
                candidate.score
            ));
        }

        let Some(best) = fuzzy::best(&ranked) else {
            self.log
                .warning(&format!("No similar files found for \"{}\"", stem), &[]);
            return None;
        };
        self.log.success(&format!(
            "Best match: {} (score: {})",
            best.entry.name(),
            best.score
        ));

        Some((
            path::join(&dir, &best.entry.uri),
            best.entry.name().to_string(),
        ))
    }
}
