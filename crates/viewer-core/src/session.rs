//! Per-viewer session state.
//!
//! One `Session` is created when a viewer starts and dropped when it ends.
//! The browser writes it; the navigator and poller read it. A poll tick and
//! a user action can interleave at any `.await`, in which case the last
//! write wins. Locks are never held across an `.await`.

use serde::Serialize;
use std::sync::{Arc, RwLock};

/// The document currently open in the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentFile {
    /// Repository path: "/1.0.0/docs/guide.md"
    pub path: String,
    /// Display name: "guide.md"
    pub name: String,
}

impl CurrentFile {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Directory containing the document.
    pub fn dir(&self) -> &str {
        repo_links::path::parent_dir(&self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Directory being browsed; "" is the repository root
    pub current_path: String,
    /// Open document, `None` when the viewer is closed
    pub current_file: Option<CurrentFile>,
}

/// Shared handle to the session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn current_path(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .current_path
            .clone()
    }

    pub fn set_current_path(&self, path: &str) {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .current_path = path.to_string();
    }

    pub fn current_file(&self) -> Option<CurrentFile> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .current_file
            .clone()
    }

    pub fn set_current_file(&self, file: Option<CurrentFile>) {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .current_file = file;
    }
}
