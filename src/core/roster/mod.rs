//! Student roster lookup.
//!
//! # Architecture
//!
//! ```text
//!   RosterSource (HTTP / local dir)
//!          |
//!          v
//!   DatasetStore + InitialsTable  <-- LiveRoster publishes as loads land
//!          |
//!          v  RosterSnapshot
//!   classify -> run_strategy (per partition) -> aggregate
//!          |
//!          v
//!   QueryResolver (cap, memo, latest-query gate)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use roster_lookup::core::roster::{DatasetStore, InitialsTable, Query, search};
//!
//! let results = search(&Query::new("张三"), &store, &table, 30);
//! ```

pub mod aggregate;
pub mod cache;
pub mod classifier;
pub mod error;
pub mod initials;
pub mod live;
pub mod matcher;
pub mod models;
pub mod resolver;
pub mod source;
pub mod store;

pub use aggregate::{aggregate, DEFAULT_RESULT_CAP};
pub use cache::{CacheStats, SearchCache, DEFAULT_CACHE_CAPACITY};
pub use classifier::{classify, SearchMode, Strategy};
pub use error::{Result, RosterError};
pub use initials::InitialsTable;
pub use live::{LiveRoster, LoadProgress, LoadStatus, RosterSnapshot};
pub use models::{PartitionKey, PartitionRestriction, RosterDocument, StudentRecord};
pub use resolver::{search, Query, QueryGate, QueryResolver, QueryTicket, SearchOutcome};
pub use source::{FileSource, HttpSource, RosterSource};
pub use store::{load_initials_table, DatasetStore};
