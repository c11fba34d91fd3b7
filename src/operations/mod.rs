pub mod aggregator;
pub mod commit_reporter;
pub mod pipeline;
pub mod workspace;

pub use aggregator::{aggregate, HistoryAggregator};
pub use commit_reporter::{report_artifact_path, CommitReporter};
pub use pipeline::{run, run_with, RunOptions, RunOutcome, AGGREGATE_FILE_NAME};
pub use workspace::Workspace;
