pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod scanner;
pub mod utils;
pub mod vcs;

#[cfg(test)]
mod test_support;

// 重新导出常用模块
pub use error::{VolvError, VolvResult};
pub use operations::{run, run_with, RunOptions, RunOutcome};
