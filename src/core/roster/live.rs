//! Progressive loading.
//!
//! [`LiveRoster`] starts every partition load and the initials-table load at
//! once and publishes each result as soon as it lands. Searches can run at any
//! time against a [`RosterSnapshot`]; partitions still in flight simply
//! contribute no results.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;

use super::error::{Result, RosterError};
use super::initials::InitialsTable;
use super::models::{PartitionKey, StudentRecord};
use super::source::RosterSource;
use super::store::{fetch_records, load_initials_table, DatasetStore};

// ============================================================================
// Snapshot
// ============================================================================

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Immutable view of everything loaded so far.
///
/// Every snapshot built, and every publish into a [`LiveRoster`], takes a fresh
/// process-wide revision. Two snapshots share a revision only if they are
/// clones of each other, so the revision can key memoized results.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    store: Arc<DatasetStore>,
    initials: Arc<InitialsTable>,
    revision: u64,
}

impl RosterSnapshot {
    /// Snapshot over fully loaded data, e.g. from [`DatasetStore::load`].
    pub fn new(store: DatasetStore, initials: InitialsTable) -> Self {
        Self {
            store: Arc::new(store),
            initials: Arc::new(initials),
            revision: next_revision(),
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn initials(&self) -> &InitialsTable {
        &self.initials
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for RosterSnapshot {
    fn default() -> Self {
        Self::new(DatasetStore::default(), InitialsTable::empty())
    }
}

// ============================================================================
// Load status
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    Pending,
    Loaded { entries: usize },
    /// The load failed; the partition (or table) is published empty.
    Failed { reason: String },
}

impl LoadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }
}

/// Loading-state signal for callers that want to show progress.
#[derive(Debug, Clone, Serialize)]
pub struct LoadProgress {
    pub partitions: BTreeMap<PartitionKey, LoadStatus>,
    pub initials: LoadStatus,
}

impl LoadProgress {
    pub fn is_loading(&self) -> bool {
        self.initials.is_pending() || self.partitions.values().any(LoadStatus::is_pending)
    }

    pub fn pending_partitions(&self) -> Vec<PartitionKey> {
        self.partitions
            .iter()
            .filter(|(_, status)| status.is_pending())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn failed_partitions(&self) -> Vec<PartitionKey> {
        self.partitions
            .iter()
            .filter(|(_, status)| matches!(status, LoadStatus::Failed { .. }))
            .map(|(key, _)| *key)
            .collect()
    }
}

// ============================================================================
// LiveRoster
// ============================================================================

struct State {
    snapshot: RosterSnapshot,
    progress: LoadProgress,
}

struct Shared {
    state: RwLock<State>,
    /// Number of loads still outstanding.
    remaining: watch::Sender<usize>,
}

/// Shared handle to a roster that is loading in the background.
#[derive(Clone)]
pub struct LiveRoster {
    shared: Arc<Shared>,
}

/// Run a load on its own task so a panic is reported as a failure and the
/// slot is still published.
async fn isolated<T, F>(load: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    match tokio::spawn(load).await {
        Ok(result) => result,
        Err(e) => Err(RosterError::Task(e.to_string())),
    }
}

impl LiveRoster {
    /// Start loading `keys` and the initials table from `source`.
    ///
    /// Must be called from within a tokio runtime. Each load runs as its own
    /// task; none of them waits on another.
    pub fn spawn(source: Arc<dyn RosterSource>, keys: &[PartitionKey]) -> Self {
        let mut keys = keys.to_vec();
        keys.sort();
        keys.dedup();

        let progress = LoadProgress {
            partitions: keys.iter().map(|&key| (key, LoadStatus::Pending)).collect(),
            initials: LoadStatus::Pending,
        };
        let (remaining, _) = watch::channel(keys.len() + 1);
        let roster = Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    snapshot: RosterSnapshot::default(),
                    progress,
                }),
                remaining,
            }),
        };

        tracing::info!(source = %source.describe(), partitions = keys.len(), "Starting roster load");

        for key in keys {
            let source = Arc::clone(&source);
            let roster = roster.clone();
            tokio::spawn(async move {
                let result = isolated(async move { fetch_records(source.as_ref(), key).await }).await;
                roster.publish_partition(key, result);
            });
        }

        let initials_roster = roster.clone();
        tokio::spawn(async move {
            let result = isolated(async move { load_initials_table(source.as_ref()).await }).await;
            initials_roster.publish_initials(result);
        });

        roster
    }

    /// Everything loaded so far.
    pub fn snapshot(&self) -> RosterSnapshot {
        self.read(|state| state.snapshot.clone())
    }

    pub fn progress(&self) -> LoadProgress {
        self.read(|state| state.progress.clone())
    }

    pub fn is_loading(&self) -> bool {
        *self.shared.remaining.borrow() > 0
    }

    /// Wait for every load to finish, successfully or not.
    pub async fn wait_until_loaded(&self) -> RosterSnapshot {
        let mut rx = self.shared.remaining.subscribe();
        // The sender lives in `shared`, so the channel cannot close while we hold it.
        let _ = rx.wait_for(|remaining| *remaining == 0).await;
        self.snapshot()
    }

    fn publish_partition(&self, key: PartitionKey, result: Result<Vec<StudentRecord>>) {
        let (records, status) = match result {
            Ok(records) => {
                let entries = records.len();
                (records, LoadStatus::Loaded { entries })
            }
            Err(e) => {
                tracing::error!(partition = %key, error = %e, "Failed to load partition, using empty roster");
                (Vec::new(), LoadStatus::Failed { reason: e.to_string() })
            }
        };

        self.write(|state| {
            let mut store = (*state.snapshot.store).clone();
            if store.insert(key, records) {
                state.snapshot.store = Arc::new(store);
                state.snapshot.revision = next_revision();
            }
            state.progress.partitions.insert(key, status);
        });
        self.finish_one();
    }

    fn publish_initials(&self, result: Result<InitialsTable>) {
        let (table, status) = match result {
            Ok(table) => {
                let entries = table.len();
                (table, LoadStatus::Loaded { entries })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Initials table unavailable, initials search will match nothing");
                (InitialsTable::empty(), LoadStatus::Failed { reason: e.to_string() })
            }
        };

        self.write(|state| {
            state.snapshot.initials = Arc::new(table);
            state.snapshot.revision = next_revision();
            state.progress.initials = status;
        });
        self.finish_one();
    }

    fn finish_one(&self) {
        let mut all_done = false;
        self.shared.remaining.send_modify(|remaining| {
            *remaining = remaining.saturating_sub(1);
            all_done = *remaining == 0;
        });
        if all_done {
            let progress = self.progress();
            tracing::info!(
                records = self.snapshot().store().total_records(),
                failed = ?progress.failed_partitions(),
                "Roster load complete"
            );
        }
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        let guard = self
            .shared
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut State)) {
        let mut guard = self
            .shared
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}
