//! viewer-server library: the proxy and CLI commands behind `artifactory-viewer`.
//!
//! Exposed as a library so integration tests can start the router on an
//! ephemeral port.

pub mod commands;
pub mod config;
pub mod proxy;
pub mod server;
pub mod upstream;

pub use config::{Config, ConfigError};
pub use proxy::AppState;
pub use server::{router, serve, shutdown_signal};
pub use upstream::Upstream;
