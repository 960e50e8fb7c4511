//! Query resolution.
//!
//! [`search`] is the whole lookup as a pure function of the query, the loaded
//! store and the initials table. [`QueryResolver`] layers the configured cap,
//! a result memo, and latest-query-wins delivery on top of it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::aggregate::{aggregate, DEFAULT_RESULT_CAP};
use super::cache::{CacheStats, SearchCache};
use super::classifier::{SearchMode, Strategy};
use super::initials::InitialsTable;
use super::live::RosterSnapshot;
use super::matcher::run_strategy;
use super::models::{PartitionRestriction, StudentRecord};
use super::store::DatasetStore;

// ============================================================================
// Query
// ============================================================================

/// A single lookup request. The text is stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Query {
    text: String,
    pub restriction: PartitionRestriction,
    pub mode: SearchMode,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        Self {
            text: raw.trim().to_string(),
            restriction: PartitionRestriction::All,
            mode: SearchMode::Auto,
        }
    }

    pub fn in_partitions(mut self, restriction: PartitionRestriction) -> Self {
        self.restriction = restriction;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Strategy this query resolves to; `None` when blank.
    pub fn strategy(&self) -> Option<Strategy> {
        self.mode.strategy_for(&self.text)
    }
}

// ============================================================================
// Pure search
// ============================================================================

/// Run `query` against every selected partition and merge the matches.
///
/// Partitions that are not loaded contribute nothing. Results keep partition
/// order then record order, are de-duplicated by student ID, and are capped.
pub fn search(
    query: &Query,
    store: &DatasetStore,
    table: &InitialsTable,
    cap: usize,
) -> Vec<StudentRecord> {
    let Some(strategy) = query.strategy() else {
        return Vec::new();
    };
    let text = query.text();

    let matches = store
        .selected(query.restriction)
        .flat_map(|(_, records)| run_strategy(strategy, records, text, table));

    aggregate(matches, cap).into_iter().cloned().collect()
}

// ============================================================================
// Latest-query gate
// ============================================================================

/// Issued for each query; only the most recently issued ticket is current.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    id: u64,
    query: Query,
}

impl QueryTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug, Default)]
pub struct QueryGate {
    latest: AtomicU64,
}

impl QueryGate {
    pub fn issue(&self, query: Query) -> QueryTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        QueryTicket { id, query }
    }

    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.id
    }
}

// ============================================================================
// QueryResolver
// ============================================================================

/// Search result handed to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub restriction: String,
    pub strategy: Option<Strategy>,
    pub results: Arc<[StudentRecord]>,
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub struct QueryResolver {
    cap: usize,
    cache: SearchCache,
    gate: QueryGate,
}

impl QueryResolver {
    pub fn new(cap: usize, cache_capacity: usize) -> Self {
        Self {
            cap,
            cache: SearchCache::new(cache_capacity),
            gate: QueryGate::default(),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Search immediately, bypassing the latest-query gate.
    pub fn search(&self, query: &Query, snapshot: &RosterSnapshot) -> SearchOutcome {
        let results: Arc<[StudentRecord]> = if query.strategy().is_none() {
            Arc::from(Vec::new())
        } else {
            self.cache.get_or_insert_with(query, snapshot.revision(), || {
                search(query, snapshot.store(), snapshot.initials(), self.cap)
            })
        };
        tracing::debug!(
            query = query.text(),
            strategy = ?query.strategy(),
            results = results.len(),
            revision = snapshot.revision(),
            "Query resolved"
        );
        SearchOutcome {
            query: query.text().to_string(),
            restriction: query.restriction.to_string(),
            strategy: query.strategy(),
            results,
        }
    }

    /// Register `query` as the newest request, superseding earlier tickets.
    pub fn issue(&self, query: Query) -> QueryTicket {
        self.gate.issue(query)
    }

    /// Resolve a ticket. Returns `None` if a newer query was issued before the
    /// results were ready, so stale results are never delivered.
    pub fn resolve(&self, ticket: &QueryTicket, snapshot: &RosterSnapshot) -> Option<SearchOutcome> {
        if !self.gate.is_current(ticket) {
            return None;
        }
        let outcome = self.search(ticket.query(), snapshot);
        if self.gate.is_current(ticket) {
            Some(outcome)
        } else {
            tracing::trace!(ticket = ticket.id(), "Discarding superseded query results");
            None
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_CAP, super::cache::DEFAULT_CACHE_CAPACITY)
    }
}
