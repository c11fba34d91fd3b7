use std::path::{Path, PathBuf};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Commit, ErrorCode, Repository, Sort};

use crate::error::{VolvError, VolvResult};
use crate::vcs::VersionControl;

/// 基于 libgit2 的版本控制后端，不依赖外部 git 可执行文件
#[derive(Debug, Clone, Default)]
pub struct Libgit2Vcs;

impl Libgit2Vcs {
    pub fn new() -> Self {
        Self
    }
}

/// 在阻塞线程池中执行 libgit2 调用，错误统一转成消息字符串
async fn run_blocking<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, git2::Error> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.message().to_string()),
        Err(err) => Err(format!("后台任务失败: {}", err)),
    }
}

/// 解析分支名或提交引用
///
/// 依次尝试本地分支、`origin` 远程分支和任意 revspec。
/// 返回提交以及应当指向的本地分支引用名（如果是分支）。
fn resolve_target<'r>(repo: &'r Repository, target: &str) -> Result<(Commit<'r>, Option<String>), git2::Error> {
    if let Ok(branch) = repo.find_branch(target, BranchType::Local) {
        let commit = branch.get().peel_to_commit()?;
        return Ok((commit, Some(format!("refs/heads/{}", target))));
    }

    // 克隆后只有默认分支是本地分支，其他分支需要从 origin 创建
    let remote_name = format!("origin/{}", target);
    if let Ok(remote_branch) = repo.find_branch(&remote_name, BranchType::Remote) {
        let commit = remote_branch.get().peel_to_commit()?;
        let mut local = repo.branch(target, &commit, false)?;
        local.set_upstream(Some(remote_name.as_str()))?;
        return Ok((commit, Some(format!("refs/heads/{}", target))));
    }

    let commit = repo.revparse_single(target)?.peel_to_commit()?;
    Ok((commit, None))
}

/// 只解析出提交，不创建任何本地分支
fn resolve_commit<'r>(repo: &'r Repository, branch: &str) -> Result<Commit<'r>, git2::Error> {
    if let Ok(local) = repo.find_branch(branch, BranchType::Local) {
        return local.get().peel_to_commit();
    }
    if let Ok(remote) = repo.find_branch(&format!("origin/{}", branch), BranchType::Remote) {
        return remote.get().peel_to_commit();
    }
    repo.revparse_single(branch)?.peel_to_commit()
}

impl VersionControl for Libgit2Vcs {
    async fn ensure_available(&self) -> VolvResult<()> {
        let version = git2::Version::get();
        let (major, minor, rev) = version.libgit2_version();
        tracing::debug!("libgit2 {}.{}.{}", major, minor, rev);
        Ok(())
    }

    async fn clone_repository(&self, remote: &str, dest: &Path) -> VolvResult<()> {
        let url = remote.to_string();
        let dest: PathBuf = dest.to_path_buf();

        run_blocking(move || Repository::clone(&url, &dest).map(|_| ()))
            .await
            .map_err(|output| VolvError::Clone {
                remote: remote.to_string(),
                output,
            })
    }

    async fn checkout(&self, workdir: &Path, target: &str) -> VolvResult<()> {
        let workdir = workdir.to_path_buf();
        let target_owned = target.to_string();

        run_blocking(move || {
            let repo = Repository::open(&workdir)?;
            let (commit, branch_ref) = resolve_target(&repo, &target_owned)?;

            // 强制检出并删除未跟踪文件，保证工作树与目标提交完全一致
            let mut builder = CheckoutBuilder::new();
            builder.force().remove_untracked(true);
            repo.checkout_tree(commit.as_object(), Some(&mut builder))?;

            match branch_ref {
                Some(reference) => repo.set_head(&reference)?,
                None => repo.set_head_detached(commit.id())?,
            }
            Ok(())
        })
        .await
        .map_err(|output| VolvError::Checkout {
            reference: target.to_string(),
            output,
        })
    }

    async fn list_commits(&self, workdir: &Path, branch: &str) -> VolvResult<Vec<String>> {
        let workdir = workdir.to_path_buf();
        let branch_owned = branch.to_string();

        run_blocking(move || {
            let repo = Repository::open(&workdir)?;
            let tip = resolve_commit(&repo, &branch_owned)?;

            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
            revwalk.push(tip.id())?;

            let commits = revwalk
                .map(|oid| oid.map(|oid| oid.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(commits)
        })
        .await
        .map_err(|output| VolvError::Enumeration {
            branch: branch.to_string(),
            output,
        })
    }

    async fn current_branch(&self, workdir: &Path) -> VolvResult<Option<String>> {
        let workdir = workdir.to_path_buf();

        run_blocking(move || {
            let repo = Repository::open(&workdir)?;
            let head = match repo.head() {
                Ok(head) => head,
                // 空仓库：HEAD 是指向尚未诞生分支的符号引用
                Err(err) if err.code() == ErrorCode::UnbornBranch => {
                    let head = repo.find_reference("HEAD")?;
                    let branch = head
                        .symbolic_target()
                        .and_then(|target| target.strip_prefix("refs/heads/"))
                        .map(str::to_string);
                    return Ok(branch);
                }
                Err(err) => return Err(err),
            };

            if head.is_branch() {
                Ok(head.shorthand().map(str::to_string))
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(|message| VolvError::Setup { message })
    }

    async fn has_commits(&self, workdir: &Path) -> VolvResult<bool> {
        let path = workdir.to_path_buf();
        let workdir = path.clone();

        run_blocking(move || {
            let repo = Repository::open(&workdir)?;
            for reference in repo.references()? {
                if reference?.peel_to_commit().is_ok() {
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await
        .map_err(|output| VolvError::Workspace {
            path,
            source: std::io::Error::new(std::io::ErrorKind::Other, output),
        })
    }
}
