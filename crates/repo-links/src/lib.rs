//! Link resolution and change detection for browsing a remote repository
//!
//! Everything here is pure: no I/O, no async. The viewer session feeds these
//! functions with listings fetched from the repository API.
//!
//! - [`path`]: resolve relative link targets against the open document
//! - [`fuzzy`]: find a renamed file when the exact link target is missing
//! - [`changes`]: added/modified/removed sets between two listings
//! - [`href`]: classify hyperlinks and extract them from markdown
//! - [`format`]: sizes and intervals for display

pub mod changes;
pub mod entry;
pub mod format;
pub mod fuzzy;
pub mod href;
pub mod path;

pub use changes::{diff, ChangeSet};
pub use entry::{sort_for_display, DirectoryEntry};
pub use fuzzy::{base_name_of, find_similar, ScoredCandidate};
pub use href::{classify, extract_links, HrefKind, MarkdownLink};
pub use path::resolve;
