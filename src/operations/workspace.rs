use std::path::{Path, PathBuf};

use crate::error::{VolvError, VolvResult};
use crate::vcs::VersionControl;

/// 克隆出来的工作树，流水线中唯一的共享可变资源
///
/// 检出需要 `&mut self`，扫描只能拿到 `&self`，因此同一时间只会有一个
/// 检出或一个读取在进行。值被丢弃时目录会被删除。
pub struct Workspace<V> {
    root: PathBuf,
    vcs: V,
    discarded: bool,
}

impl<V: VersionControl> Workspace<V> {
    /// 将 `remote` 克隆到 `root`，`root` 已存在时先清空（可能是上次中断运行的残留）
    pub async fn clone_into(vcs: V, remote: &str, root: PathBuf) -> VolvResult<Self> {
        if tokio::fs::try_exists(&root).await.unwrap_or(false) {
            tracing::warn!("工作区目录已存在，将被清空: {}", root.display());
            tokio::fs::remove_dir_all(&root)
                .await
                .map_err(|source| VolvError::Workspace { path: root.clone(), source })?;
        }

        if let Some(parent) = root.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| VolvError::Workspace { path: parent.to_path_buf(), source })?;
        }

        tracing::info!("正在克隆 {} 到 {}", remote, root.display());
        if let Err(err) = vcs.clone_repository(remote, &root).await {
            // 克隆失败时可能留下部分目录
            if let Err(cleanup) = tokio::fs::remove_dir_all(&root).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("清理失败的克隆目录时出错: {}", cleanup);
                }
            }
            return Err(err);
        }

        Ok(Self::attach(vcs, root))
    }

    /// 使用一个已经由克隆填充过的目录
    pub fn attach(vcs: V, root: PathBuf) -> Self {
        Self {
            root,
            vcs,
            discarded: false,
        }
    }

    /// 将工作树切换到 `reference`
    pub async fn set_to(&mut self, reference: &str) -> VolvResult<()> {
        self.vcs.checkout(&self.root, reference).await
    }

    /// 克隆后默认检出的分支
    pub async fn current_branch(&self) -> VolvResult<Option<String>> {
        self.vcs.current_branch(&self.root).await
    }

    /// 克隆下来的仓库是否有任何提交
    pub async fn has_commits(&self) -> VolvResult<bool> {
        self.vcs.has_commits(&self.root).await
    }

    /// 删除工作区目录
    pub async fn discard(mut self) -> VolvResult<()> {
        self.discarded = true;
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(VolvError::Workspace {
                path: self.root.clone(),
                source,
            }),
        }
    }
}

impl<V> Workspace<V> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }
}

impl<V> Drop for Workspace<V> {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.root) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "清理工作区 {} 时出错，可能需要手动删除: {}",
                    self.root.display(),
                    err
                );
            }
        }
    }
}
