pub mod history;
pub mod tree_scanner;

pub use history::HistoryEnumerator;
pub use tree_scanner::{ScannedFile, TreeScanner};
