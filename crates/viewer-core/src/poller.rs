//! Periodic change detection for the browsed directory.
//!
//! While enabled, the poller lists the session's current directory every
//! period and diffs the result against the last snapshot of that same
//! directory. Non-empty differences go to the [`NotificationSink`].
//!
//! Each tick runs in its own task. `disable()` stops the timer and bumps a
//! generation counter; a listing that resolves afterwards sees the stale
//! generation and is discarded instead of notifying.

use repo_links::{ChangeSet, DirectoryEntry, diff};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{RepoError, Result};
use crate::log::LogSink;
use crate::repository::RepositoryClient;
use crate::session::Session;

/// Default poll period (one hour)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// A captured directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySnapshot {
    pub path: String,
    pub entries: Vec<DirectoryEntry>,
}

/// Changes found in `path` since the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeNotification {
    pub path: String,
    pub changes: ChangeSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollerError {
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &ChangeNotification);
}

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Polling is off; nothing was fetched.
    Disabled,
    /// Polling was disabled or restarted while the listing was in flight.
    Discarded,
    /// No comparable snapshot existed; the listing became the new one.
    Rebased,
    Unchanged,
    Changed(ChangeSet),
    Failed(RepoError),
}

#[derive(Debug, Default)]
struct PollerState {
    enabled: bool,
    generation: u64,
    snapshot: Option<DirectorySnapshot>,
}

struct PollerShared {
    client: Arc<dyn RepositoryClient>,
    session: Session,
    notifier: Arc<dyn NotificationSink>,
    log: Arc<dyn LogSink>,
    state: Mutex<PollerState>,
}

impl PollerShared {
    fn lock(&self) -> std::sync::MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Generation to check results against, or `None` when disabled.
    fn armed_generation(&self) -> Option<u64> {
        let state = self.lock();
        state.enabled.then_some(state.generation)
    }

    async fn capture(&self) -> Result<()> {
        let Some(generation) = self.armed_generation() else {
            return Ok(());
        };
        let path = self.session.current_path();

        let entries = match self.client.list_directory(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                self.log.warning(
                    &format!("Failed to capture snapshot of {}", display_path(&path)),
                    &[("error", e.to_string())],
                );
                return Err(e);
            }
        };

        let count = entries.len();
        {
            let mut state = self.lock();
            if !state.enabled || state.generation != generation {
                return Ok(());
            }
            state.snapshot = Some(DirectorySnapshot {
                path: path.clone(),
                entries,
            });
        }
        self.log.info(&format!(
            "Captured snapshot of {} ({} items)",
            display_path(&path),
            count
        ));
        Ok(())
    }

    async fn tick(&self) -> TickOutcome {
        let Some(generation) = self.armed_generation() else {
            return TickOutcome::Disabled;
        };
        let path = self.session.current_path();
        self.log
            .info(&format!("Checking for changes in {}", display_path(&path)));

        let result = self.client.list_directory(&path).await;

        let mut state = self.lock();
        if !state.enabled || state.generation != generation {
            return TickOutcome::Discarded;
        }

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                drop(state);
                self.log.warning(
                    "Failed to check for changes",
                    &[("path", path), ("error", e.to_string())],
                );
                return TickOutcome::Failed(e);
            }
        };

        let comparable = state
            .snapshot
            .as_ref()
            .filter(|snapshot| snapshot.path == path)
            .map(|snapshot| diff(&snapshot.entries, &entries));
        let Some(changes) = comparable else {
            state.snapshot = Some(DirectorySnapshot { path, entries });
            return TickOutcome::Rebased;
        };
        if changes.is_empty() {
            return TickOutcome::Unchanged;
        }

        state.snapshot = Some(DirectorySnapshot {
            path: path.clone(),
            entries,
        });
        drop(state);

        self.log.success(&format!(
            "Changes detected in {}: {}",
            display_path(&path),
            changes.summary()
        ));
        self.notifier.notify(&ChangeNotification {
            path,
            changes: changes.clone(),
        });
        TickOutcome::Changed(changes)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

/// Timer-driven snapshot poller bound to one session.
pub struct SnapshotPoller {
    shared: Arc<PollerShared>,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SnapshotPoller {
    pub fn new(
        client: Arc<dyn RepositoryClient>,
        session: Session,
        notifier: Arc<dyn NotificationSink>,
        log: Arc<dyn LogSink>,
        interval: Duration,
    ) -> std::result::Result<Self, PollerError> {
        if interval.is_zero() {
            return Err(PollerError::ZeroInterval);
        }

        Ok(Self {
            shared: Arc::new(PollerShared {
                client,
                session,
                notifier,
                log,
                state: Mutex::new(PollerState::default()),
            }),
            interval,
            timer: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.lock().enabled
    }

    pub fn snapshot(&self) -> Option<DirectorySnapshot> {
        self.shared.lock().snapshot.clone()
    }

    /// Capture an initial snapshot and start the timer.
    ///
    /// A failed initial capture is logged; the first tick then takes the
    /// snapshot instead. Enabling an enabled poller does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn enable(&self) {
        let generation = {
            let mut state = self.shared.lock();
            if state.enabled {
                return;
            }
            state.enabled = true;
            state.generation += 1;
            state.generation
        };

        // Failure already logged
        let _ = self.shared.capture().await;

        if self.shared.armed_generation() != Some(generation) {
            // Disabled while capturing
            return;
        }

        let shared = self.shared.clone();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let shared = shared.clone();
                tokio::spawn(async move {
                    shared.tick().await;
                });
            }
        });

        {
            // Checked under the timer lock: a racing disable() either finds
            // this handle or has already bumped the generation
            let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
            if self.shared.armed_generation() != Some(generation) {
                handle.abort();
                return;
            }
            if let Some(previous) = timer.replace(handle) {
                previous.abort();
            }
        }

        self.shared.log.info(&format!(
            "Change polling enabled (every {})",
            repo_links::format::format_interval(period)
        ));
    }

    /// Stop polling. Takes effect immediately: no further ticks start and
    /// any listing still in flight is discarded when it resolves.
    pub fn disable(&self) {
        let was_enabled = {
            let mut state = self.shared.lock();
            let was_enabled = state.enabled;
            state.enabled = false;
            state.generation += 1;
            state.snapshot = None;
            was_enabled
        };

        if let Some(handle) = self.timer.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }

        if was_enabled {
            self.shared.log.info("Change polling disabled");
        }
    }

    /// Refresh the snapshot from the current directory. No-op while disabled.
    pub async fn capture(&self) -> Result<()> {
        self.shared.capture().await
    }

    /// Run one poll now, outside the timer.
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}
