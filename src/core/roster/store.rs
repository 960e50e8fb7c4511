//! Dataset store: the loaded rosters, one immutable collection per partition.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;

use super::error::Result;
use super::initials::InitialsTable;
use super::models::{PartitionKey, PartitionRestriction, StudentRecord};
use super::source::RosterSource;

/// Loaded partitions, iterated in ascending year order.
///
/// A partition that is absent has not been loaded (yet). A partition whose
/// load failed is present and empty.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    partitions: BTreeMap<PartitionKey, Arc<[StudentRecord]>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every requested partition concurrently.
    ///
    /// A partition that fails to fetch or parse is stored empty and the failure
    /// is logged; the store as a whole always loads.
    pub async fn load(source: &dyn RosterSource, keys: &[PartitionKey]) -> Self {
        let loads = keys.iter().map(|&key| async move {
            let records = load_partition(source, key).await;
            (key, records)
        });

        let mut store = Self::new();
        for (key, records) in join_all(loads).await {
            store.insert(key, records);
        }
        tracing::info!(
            source = %source.describe(),
            partitions = store.partition_count(),
            records = store.total_records(),
            "Roster store loaded"
        );
        store
    }

    /// Builder-style insert used by fixtures and the live loader.
    pub fn with_partition(mut self, key: PartitionKey, records: Vec<StudentRecord>) -> Self {
        self.insert(key, records);
        self
    }

    /// Publish a partition. Loading is once-per-partition; a second insert
    /// for the same key is ignored.
    pub fn insert(&mut self, key: PartitionKey, records: Vec<StudentRecord>) -> bool {
        if self.partitions.contains_key(&key) {
            tracing::warn!(partition = %key, "Partition already loaded, ignoring reload");
            return false;
        }
        self.partitions.insert(key, Arc::from(records));
        true
    }

    pub fn partition(&self, key: PartitionKey) -> Option<&[StudentRecord]> {
        self.partitions.get(&key).map(|records| &records[..])
    }

    pub fn contains(&self, key: PartitionKey) -> bool {
        self.partitions.contains_key(&key)
    }

    /// Loaded partitions selected by `restriction`, in search order.
    pub fn selected<'a>(
        &'a self,
        restriction: PartitionRestriction,
    ) -> impl Iterator<Item = (PartitionKey, &'a [StudentRecord])> + 'a {
        self.partitions
            .iter()
            .filter(move |(key, _)| restriction.selects(**key))
            .map(|(key, records)| (*key, &records[..]))
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn total_records(&self) -> usize {
        self.partitions.values().map(|records| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

/// Load one partition, degrading any failure to an empty collection.
pub(crate) async fn load_partition(source: &dyn RosterSource, key: PartitionKey) -> Vec<StudentRecord> {
    match fetch_records(source, key).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(partition = %key, error = %e, "Failed to load partition, using empty roster");
            Vec::new()
        }
    }
}

/// Fetch and convert one partition's rows.
pub(crate) async fn fetch_records(
    source: &dyn RosterSource,
    key: PartitionKey,
) -> Result<Vec<StudentRecord>> {
    let label = key.to_string();
    let document = retry_transient(&label, || source.fetch_partition(key)).await?;
    let declared = document.total_records;
    let (records, skipped) = document.into_records();
    if skipped > 0 {
        tracing::warn!(partition = %key, skipped, "Skipped malformed roster rows");
    }
    if let Some(declared) = declared {
        if declared as usize != records.len() + skipped {
            tracing::debug!(
                partition = %key,
                declared,
                actual = records.len(),
                "Row count differs from iTotalRecords"
            );
        }
    }
    tracing::debug!(partition = %key, records = records.len(), "Partition loaded");
    Ok(records)
}

/// Fetch the initials table. Failure is returned to the caller, which is
/// expected to fall back to [`InitialsTable::empty`].
pub async fn load_initials_table(source: &dyn RosterSource) -> Result<InitialsTable> {
    let table = retry_transient("initials", || source.fetch_initials()).await?;
    tracing::info!(entries = table.len(), "Initials table loaded");
    Ok(table)
}

/// Run `attempt`, and once more if the first failure is transient.
async fn retry_transient<T, F, Fut>(load: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match attempt().await {
        Err(e) if e.is_transient() => {
            tracing::warn!(load, error = %e, "Transient load failure, retrying once");
            attempt().await
        }
        result => result,
    }
}
