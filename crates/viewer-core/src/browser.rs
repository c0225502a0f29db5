//! The viewer session: directory browsing, document viewing and link clicks.
//!
//! `Browser` is what a front-end drives. It keeps the session state in step
//! with what is shown, hands internal links to the [`LinkNavigator`], and
//! refreshes the poller's snapshot after every directory load.

use repo_links::href::{HrefKind, MarkdownLink, classify, extract_links};
use repo_links::path::{Crumb, breadcrumbs};
use repo_links::{DirectoryEntry, sort_for_display};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::log::{LogLevel, LogSink};
use crate::navigator::{LinkNavigator, NavigationAction};
use crate::poller::SnapshotPoller;
use crate::repository::RepositoryClient;
use crate::session::{CurrentFile, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentFormat {
    Markdown,
    PlainText,
}

impl DocumentFormat {
    /// Markdown for `.md` names (any case), plain text otherwise.
    pub fn for_name(name: &str) -> Self {
        if name.to_lowercase().ends_with(".md") {
            DocumentFormat::Markdown
        } else {
            DocumentFormat::PlainText
        }
    }
}

/// An opened file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub path: String,
    pub name: String,
    pub content: String,
    pub format: DocumentFormat,
    /// Links found in markdown content; empty for plain text
    pub links: Vec<MarkdownLink>,
}

impl Document {
    /// Links that can be followed inside the repository.
    pub fn internal_links(&self) -> impl Iterator<Item = &MarkdownLink> {
        self.links
            .iter()
            .filter(|link| !link.is_image && link.kind() == HrefKind::Internal)
    }
}

/// A loaded directory, entries in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryView {
    pub path: String,
    pub breadcrumbs: Vec<Crumb>,
    pub entries: Vec<DirectoryEntry>,
}

/// Result of clicking a link in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Opened outside the viewer.
    External { href: String },
    /// In-page jump.
    Anchor { href: String },
    Opened(Document),
    Browsed(DirectoryView),
    Broken { href: String, reason: String },
}

pub struct Browser {
    client: Arc<dyn RepositoryClient>,
    session: Session,
    navigator: LinkNavigator,
    poller: Option<Arc<SnapshotPoller>>,
    log: Arc<dyn LogSink>,
}

impl Browser {
    pub fn new(client: Arc<dyn RepositoryClient>, session: Session, log: Arc<dyn LogSink>) -> Self {
        let navigator = LinkNavigator::new(client.clone(), session.clone(), log.clone());
        Self {
            client,
            session,
            navigator,
            poller: None,
            log,
        }
    }

    /// Attach a poller bound to the same session.
    pub fn with_poller(mut self, poller: Arc<SnapshotPoller>) -> Self {
        self.poller = Some(poller);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn poller(&self) -> Option<&Arc<SnapshotPoller>> {
        self.poller.as_ref()
    }

    /// Browse to `path` ("" is the root).
    ///
    /// The session moves to `path` before the listing is fetched, so a failed
    /// load still leaves the viewer positioned there.
    pub async fn load_directory(&self, path: &str) -> Result<DirectoryView> {
        self.session.set_current_path(path);

        let mut entries = match self.client.list_directory(path).await {
            Ok(entries) => entries,
            Err(e) => {
                self.log.log(
                    LogLevel::Error,
                    &format!("Failed to load directory: {}", e),
                    &[("path", path.to_string())],
                );
                return Err(e);
            }
        };
        sort_for_display(&mut entries);

        if let Some(poller) = &self.poller
            && poller.is_enabled()
        {
            // Failure is logged by the poller; the next tick rebases
            let _ = poller.capture().await;
        }

        self.log.info(&format!(
            "Loaded directory: {} ({} items)",
            if path.is_empty() { "/" } else { path },
            entries.len()
        ));

        Ok(DirectoryView {
            path: path.to_string(),
            breadcrumbs: breadcrumbs(path),
            entries,
        })
    }

    /// Reload the directory being browsed.
    pub async fn refresh(&self) -> Result<DirectoryView> {
        let path = self.session.current_path();
        self.load_directory(&path).await
    }

    /// Open a file. It becomes the current document before its content
    /// arrives, so links clicked meanwhile resolve against it.
    pub async fn open_file(&self, path: &str, name: &str) -> Result<Document> {
        self.session
            .set_current_file(Some(CurrentFile::new(path, name)));

        let content = match self.client.fetch_file(path).await {
            Ok(content) => content,
            Err(e) => {
                self.log.log(
                    LogLevel::Error,
                    &format!("Failed to load file: {}", e),
                    &[("path", path.to_string()), ("name", name.to_string())],
                );
                return Err(e);
            }
        };

        let format = DocumentFormat::for_name(name);
        let links = match format {
            DocumentFormat::Markdown => extract_links(&content),
            DocumentFormat::PlainText => Vec::new(),
        };
        self.log
            .info(&format!("Loaded file: {} ({} bytes)", name, content.len()));

        Ok(Document {
            path: path.to_string(),
            name: name.to_string(),
            content,
            format,
            links,
        })
    }

    pub fn close_file(&self) {
        self.session.set_current_file(None);
    }

    /// Follow a link clicked in the open document.
    pub async fn follow_link(&self, href: &str) -> LinkOutcome {
        match classify(href) {
            HrefKind::External => {
                return LinkOutcome::External {
                    href: href.to_string(),
                };
            }
            HrefKind::Anchor => {
                return LinkOutcome::Anchor {
                    href: href.to_string(),
                };
            }
            HrefKind::Internal => {}
        }

        match self.navigator.navigate(href).await {
            NavigationAction::OpenFile { path, name } => match self.open_file(&path, &name).await {
                Ok(document) => LinkOutcome::Opened(document),
                Err(e) => LinkOutcome::Broken {
                    href: href.to_string(),
                    reason: format!("Error loading file: {}", e),
                },
            },
            NavigationAction::OpenDirectory { path } => match self.load_directory(&path).await {
                Ok(view) => LinkOutcome::Browsed(view),
                Err(e) => LinkOutcome::Broken {
                    href: href.to_string(),
                    reason: format!("Error loading directory: {}", e),
                },
            },
            NavigationAction::LinkError { href, reason } => LinkOutcome::Broken { href, reason },
        }
    }
}
