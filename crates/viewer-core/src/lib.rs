//! viewer-core: session logic for browsing a remote binary repository.
//!
//! This crate provides:
//! - The `RepositoryClient` abstraction over listing and file retrieval
//! - Link navigation with fuzzy recovery of renamed targets
//! - Snapshot polling that reports added, modified and removed entries
//! - The `Browser` session a front-end drives, plus its log and preferences

pub mod browser;
pub mod error;
pub mod http;
pub mod listing;
pub mod log;
pub mod navigator;
pub mod poller;
pub mod preferences;
pub mod repository;
pub mod session;

pub use browser::{Browser, DirectoryView, Document, DocumentFormat, LinkOutcome};
pub use error::RepoError;
pub use http::ProxyClient;
pub use log::{DebugConsole, LogLevel, LogSink, TracingSink};
pub use navigator::{LinkNavigator, NavigationAction};
pub use poller::{
    ChangeNotification, NotificationSink, PollerError, SnapshotPoller, TickOutcome,
};
pub use preferences::{PreferenceStore, Preferences, PreferencesError};
pub use repository::{InMemoryRepository, RepositoryClient};
pub use session::{CurrentFile, Session, SessionState};
