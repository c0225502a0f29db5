//! Command-line front-end over a running proxy.
//!
//! Each command builds a viewer session against `ProxyClient`, runs it, and
//! prints the result. Rendering is split out so it can be tested without a
//! server.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use repo_links::format::{format_bytes, format_interval};
use repo_links::href::HrefKind;
use repo_links::path::file_name;
use viewer_core::log::LogEntry;
use viewer_core::{
    Browser, ChangeNotification, DebugConsole, DirectoryView, Document, LinkOutcome, LogSink,
    NotificationSink, PreferenceStore, ProxyClient, Session, SnapshotPoller, TracingSink,
};

use crate::server::shutdown_signal;

/// Where the commands find the proxy.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub proxy_url: String,
    pub timeout: Duration,
}

impl ClientOptions {
    fn client(&self) -> Result<Arc<ProxyClient>> {
        let client = ProxyClient::with_timeout(&self.proxy_url, self.timeout)
            .with_context(|| format!("Failed to create client for {}", self.proxy_url))?;
        Ok(Arc::new(client))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
    Status,
}

/// "1.0.0/docs/" -> "/1.0.0/docs"; "" and "/" are the root.
pub fn repo_path(arg: &str) -> String {
    let trimmed = arg.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// `ls`: print a directory listing.
pub async fn list(options: &ClientOptions, path: &str) -> Result<()> {
    let browser = Browser::new(options.client()?, Session::new(), Arc::new(TracingSink));
    let path = repo_path(path);
    let view = browser
        .load_directory(&path)
        .await
        .with_context(|| format!("Failed to list {}", display_path(&path)))?;

    print!("{}", render_listing(&view));
    Ok(())
}

/// `open`: print a document, then follow links from it in order.
pub async fn open(options: &ClientOptions, path: &str, follow: &[String], trace: bool) -> Result<()> {
    let console = Arc::new(DebugConsole::new());
    let log: Arc<dyn LogSink> = if trace {
        console.clone()
    } else {
        Arc::new(TracingSink)
    };
    let client = options.client()?;
    let browser = Browser::new(client.clone(), Session::new(), log);

    let path = repo_path(path);
    let document = browser
        .open_file(&path, file_name(&path))
        .await
        .with_context(|| format!("Failed to open {}", path))?;
    print!("{}", render_document(&document));

    for href in follow {
        let outcome = browser.follow_link(href).await;
        println!();
        print!("{}", render_outcome(&outcome, &client));
    }

    if trace {
        println!();
        println!("--- trace ---");
        for entry in console.entries() {
            println!("{}", render_log_entry(&entry));
        }
    }
    Ok(())
}

/// `watch`: browse `path` and report changes until interrupted.
///
/// The notification preference is read once at startup.
pub async fn watch(
    options: &ClientOptions,
    store: &PreferenceStore,
    path: &str,
    interval: Duration,
) -> Result<()> {
    let preferences = store
        .load()
        .context("Failed to read notification preference")?;
    if !preferences.notifications_enabled {
        bail!("Change notifications are off; enable them with `artifactory-viewer notifications on`");
    }

    let client = options.client()?;
    let session = Session::new();
    let log: Arc<dyn LogSink> = Arc::new(TracingSink);
    let poller = Arc::new(SnapshotPoller::new(
        client.clone(),
        session.clone(),
        Arc::new(ConsoleNotifier),
        log.clone(),
        interval,
    )?);
    let browser = Browser::new(client, session, log).with_poller(poller.clone());

    let path = repo_path(path);
    let view = browser
        .load_directory(&path)
        .await
        .with_context(|| format!("Failed to list {}", display_path(&path)))?;
    poller.enable().await;

    println!(
        "Watching {} ({} items), checking every {}. Press Ctrl+C to stop.",
        display_path(&view.path),
        view.entries.len(),
        format_interval(interval)
    );

    shutdown_signal().await;
    poller.disable();
    Ok(())
}

/// `notifications`: switch change notifications on or off, or show the setting.
pub fn notifications(store: &PreferenceStore, toggle: Toggle) -> Result<()> {
    let preferences = match toggle {
        Toggle::On => store.update(|p| p.notifications_enabled = true)?,
        Toggle::Off => store.update(|p| p.notifications_enabled = false)?,
        Toggle::Status => store.load()?,
    };

    println!(
        "Change notifications are {}",
        if preferences.notifications_enabled {
            "on"
        } else {
            "off"
        }
    );
    Ok(())
}

/// Prints change notifications to stdout.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: &ChangeNotification) {
        print!("{}", render_changes(notification));
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

pub fn render_listing(view: &DirectoryView) -> String {
    let mut out = String::new();
    let trail: Vec<_> = view.breadcrumbs.iter().map(|c| c.label.as_str()).collect();
    let _ = writeln!(out, "{}", trail.join(" / "));

    if view.entries.is_empty() {
        let _ = writeln!(out, "  (empty)");
        return out;
    }

    for entry in &view.entries {
        if entry.is_folder {
            let _ = writeln!(out, "  {}/", entry.name());
        } else {
            let size = entry.size.map(format_bytes).unwrap_or_default();
            let modified = entry.last_modified.as_deref().unwrap_or("");
            let line = format!("  {:<48} {:>12}  {}", entry.name(), size, modified);
            let _ = writeln!(out, "{}", line.trim_end());
        }
    }
    out
}

pub fn render_document(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ({}) ==", document.name, document.path);
    out.push_str(&document.content);
    if !document.content.ends_with('\n') {
        out.push('\n');
    }

    if !document.links.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Links:");
        for link in &document.links {
            let kind = match link.kind() {
                HrefKind::External => "external",
                HrefKind::Anchor => "anchor",
                HrefKind::Internal => "internal",
            };
            let marker = if link.is_image { "image" } else { "link" };
            let _ = writeln!(out, "  [{} {}] {} -> {}", kind, marker, link.text, link.target);
        }
    }
    out
}

pub fn render_outcome(outcome: &LinkOutcome, client: &ProxyClient) -> String {
    match outcome {
        LinkOutcome::External { href } => format!("Opens outside the viewer: {}\n", href),
        LinkOutcome::Anchor { href } => format!("In-page anchor: {}\n", href),
        LinkOutcome::Opened(document) => format!(
            "{}Download: {}\n",
            render_document(document),
            client.file_url(&document.path)
        ),
        LinkOutcome::Browsed(view) => render_listing(view),
        LinkOutcome::Broken { href, reason } => format!("Broken link {}: {}\n", href, reason),
    }
}

pub fn render_changes(notification: &ChangeNotification) -> String {
    let changes = &notification.changes;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Changes in {}: {}",
        display_path(&notification.path),
        changes.summary()
    );
    for entry in &changes.added {
        let _ = writeln!(out, "  + {}", entry.name());
    }
    for entry in &changes.modified {
        let _ = writeln!(out, "  ~ {}", entry.name());
    }
    for entry in &changes.removed {
        let _ = writeln!(out, "  - {}", entry.name());
    }
    out
}

pub fn render_log_entry(entry: &LogEntry) -> String {
    let level = match entry.level {
        viewer_core::LogLevel::Info => "INFO",
        viewer_core::LogLevel::Success => "OK",
        viewer_core::LogLevel::Warning => "WARN",
        viewer_core::LogLevel::Error => "ERROR",
    };
    let mut line = format!("[{:<5}] {}", level, entry.message);
    for (key, value) in &entry.details {
        let _ = write!(line, " {}={}", key, value);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_links::{ChangeSet, DirectoryEntry};
    use repo_links::path::breadcrumbs;
    use viewer_core::DocumentFormat;

    #[test]
    fn repo_paths_are_rooted() {
        assert_eq!(repo_path(""), "");
        assert_eq!(repo_path("/"), "");
        assert_eq!(repo_path("1.0.0/docs/"), "/1.0.0/docs");
        assert_eq!(repo_path("/1.0.0"), "/1.0.0");
    }

    #[test]
    fn listing_shows_folders_and_sizes() {
        let view = DirectoryView {
            path: "/1.0.0".into(),
            breadcrumbs: breadcrumbs("/1.0.0"),
            entries: vec![
                DirectoryEntry::folder("/docs"),
                DirectoryEntry::file("/lib.aar").with_size(1536),
                DirectoryEntry::file("/NOTES"),
            ],
        };
        let out = render_listing(&view);
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines[0], "Root / 1.0.0");
        assert_eq!(lines[1], "  docs/");
        assert!(lines[2].starts_with("  lib.aar"));
        assert!(lines[2].contains("1.5 KB"));
        assert_eq!(lines[3], "  NOTES");
    }

    #[test]
    fn empty_listing() {
        let view = DirectoryView {
            path: String::new(),
            breadcrumbs: breadcrumbs(""),
            entries: Vec::new(),
        };
        assert_eq!(render_listing(&view), "Root\n  (empty)\n");
    }

    #[test]
    fn document_lists_its_links() {
        let document = Document {
            path: "/1.0.0/README.md".into(),
            name: "README.md".into(),
            content: "# Hi".into(),
            format: DocumentFormat::Markdown,
            links: repo_links::extract_links("[a](b.md) [c](https://d.example)"),
        };
        let out = render_document(&document);

        assert!(out.starts_with("== README.md (/1.0.0/README.md) ==\n# Hi\n"));
        assert!(out.contains("  [internal link] a -> b.md\n"));
        assert!(out.contains("  [external link] c -> https://d.example\n"));
    }

    #[test]
    fn changes_render_one_line_per_entry() {
        let notification = ChangeNotification {
            path: "/1.0.0".into(),
            changes: ChangeSet {
                added: vec![DirectoryEntry::file("/CHANGELOG.md")],
                modified: Vec::new(),
                removed: vec![DirectoryEntry::file("/old.md")],
            },
        };

        assert_eq!(
            render_changes(&notification),
            "Changes in /1.0.0: 1 file(s) added, 1 file(s) removed\n  + CHANGELOG.md\n  - old.md\n"
        );
    }

    #[test]
    fn broken_link_outcome() {
        let client = ProxyClient::new("http://localhost:3000").unwrap();
        let outcome = LinkOutcome::Broken {
            href: "missing.md".into(),
            reason: "File not found.".into(),
        };

        assert_eq!(
            render_outcome(&outcome, &client),
            "Broken link missing.md: File not found.\n"
        );
    }
}
