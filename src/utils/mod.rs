pub mod repo_name;

pub use repo_name::repo_name;
