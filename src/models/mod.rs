pub mod aggregate;
pub mod commit;

pub use aggregate::{Aggregate, AggregateEntry, CommitStats, HistorySummary};
pub use commit::{CommitRef, CommitReport, FileEntry, PersistedEntry};
