//! 版本控制能力
//!
//! 流水线只依赖 [`VersionControl`] 这一组操作：克隆、检出、按从旧到新的顺序
//! 列出分支上的提交。每个操作失败时都返回对应阶段的 [`VolvError`] 变体。

pub mod git_cli;
pub mod libgit2;

use std::path::Path;

use crate::config::{VcsBackendKind, VcsConfig};
use crate::error::VolvResult;

pub use git_cli::GitCli;
pub use libgit2::Libgit2Vcs;

#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// 检查后端是否可用（例如 git 是否已安装）
    async fn ensure_available(&self) -> VolvResult<()>;

    /// 将 `remote` 克隆到 `dest`，`dest` 不能已存在
    async fn clone_repository(&self, remote: &str, dest: &Path) -> VolvResult<()>;

    /// 将 `workdir` 的工作树切换到 `target`（分支名或提交哈希）
    async fn checkout(&self, workdir: &Path, target: &str) -> VolvResult<()>;

    /// 列出从 `branch` 可达的所有提交，最旧的在前
    async fn list_commits(&self, workdir: &Path, branch: &str) -> VolvResult<Vec<String>>;

    /// 当前检出的分支名，处于分离 HEAD 时返回 `None`
    ///
    /// 空仓库的 HEAD 指向尚未诞生的分支，此时返回该分支名。
    async fn current_branch(&self, workdir: &Path) -> VolvResult<Option<String>>;

    /// 仓库中是否至少有一个提交（克隆空仓库后为 `false`）
    async fn has_commits(&self, workdir: &Path) -> VolvResult<bool>;
}

/// 根据配置选择的后端
#[derive(Debug, Clone)]
pub enum Vcs {
    Cli(GitCli),
    Libgit2(Libgit2Vcs),
}

impl Vcs {
    pub fn from_config(config: &VcsConfig) -> Self {
        match config.backend {
            VcsBackendKind::Cli => Vcs::Cli(GitCli::new(config.git_binary.clone())),
            VcsBackendKind::Libgit2 => Vcs::Libgit2(Libgit2Vcs::new()),
        }
    }
}

impl VersionControl for Vcs {
    async fn ensure_available(&self) -> VolvResult<()> {
        match self {
            Vcs::Cli(git) => git.ensure_available().await,
            Vcs::Libgit2(git) => git.ensure_available().await,
        }
    }

    async fn clone_repository(&self, remote: &str, dest: &Path) -> VolvResult<()> {
        match self {
            Vcs::Cli(git) => git.clone_repository(remote, dest).await,
            Vcs::Libgit2(git) => git.clone_repository(remote, dest).await,
        }
    }

    async fn checkout(&self, workdir: &Path, target: &str) -> VolvResult<()> {
        match self {
            Vcs::Cli(git) => git.checkout(workdir, target).await,
            Vcs::Libgit2(git) => git.checkout(workdir, target).await,
        }
    }

    async fn list_commits(&self, workdir: &Path, branch: &str) -> VolvResult<Vec<String>> {
        match self {
            Vcs::Cli(git) => git.list_commits(workdir, branch).await,
            Vcs::Libgit2(git) => git.list_commits(workdir, branch).await,
        }
    }

    async fn current_branch(&self, workdir: &Path) -> VolvResult<Option<String>> {
        match self {
            Vcs::Cli(git) => git.current_branch(workdir).await,
            Vcs::Libgit2(git) => git.current_branch(workdir).await,
        }
    }

    async fn has_commits(&self, workdir: &Path) -> VolvResult<bool> {
        match self {
            Vcs::Cli(git) => git.has_commits(workdir).await,
            Vcs::Libgit2(git) => git.has_commits(workdir).await,
        }
    }
}
