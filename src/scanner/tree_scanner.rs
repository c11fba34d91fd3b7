use std::collections::HashSet;
use std::path::{Path, PathBuf};
use futures::stream::{self, StreamExt, TryStreamExt};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{VolvError, VolvResult};

/// 工作树扫描器 - 列出工作树中的每个文件及其大小
#[derive(Debug, Clone)]
pub struct TreeScanner {
    /// 需要跳过的目录名
    exclude: HashSet<String>,

    /// 最大并发 stat 数
    max_concurrent_stats: usize,

    /// 是否跟随符号链接
    follow_symlinks: bool,
}

/// 扫描得到的单个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size: u64,
}

impl TreeScanner {
    pub fn new() -> Self {
        Self::with_config(&ScanConfig::default())
    }

    /// 使用扫描配置创建扫描器
    pub fn with_config(config: &ScanConfig) -> Self {
        Self {
            exclude: config.exclude.iter().cloned().collect(),
            max_concurrent_stats: config.concurrent_stats.max(1),
            follow_symlinks: config.follow_symlinks,
        }
    }

    /// 扫描 `root` 下的所有文件，结果按路径排序
    ///
    /// 任何一个文件无法读取都会让整个扫描失败，而不是返回不完整的列表。
    pub async fn scan(&self, root: &Path) -> VolvResult<Vec<ScannedFile>> {
        let paths = self.discover_files(root).await?;

        let follow_symlinks = self.follow_symlinks;
        // buffered 保持输入顺序，因此结果顺序与发现顺序一致
        stream::iter(paths)
            .map(|path| async move {
                let metadata = if follow_symlinks {
                    tokio::fs::metadata(&path).await
                } else {
                    tokio::fs::symlink_metadata(&path).await
                };

                match metadata {
                    Ok(metadata) => Ok(ScannedFile {
                        size: metadata.len(),
                        path,
                    }),
                    Err(source) => Err(VolvError::Stat { path, source }),
                }
            })
            .buffered(self.max_concurrent_stats)
            .try_collect()
            .await
    }

    /// 遍历目录树，返回所有非目录条目的路径
    async fn discover_files(&self, root: &Path) -> VolvResult<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let walk_root = root.clone();
        let exclude = self.exclude.clone();
        let follow_symlinks = self.follow_symlinks;

        // 使用 tokio::task::spawn_blocking 在线程池中运行同步遍历
        let discovered = tokio::task::spawn_blocking(move || -> VolvResult<Vec<PathBuf>> {
            let mut paths = Vec::new();

            let walker = WalkDir::new(&walk_root)
                .follow_links(follow_symlinks)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_excluded(&exclude, entry.file_name()));

            for entry in walker {
                let entry = entry.map_err(|source| VolvError::Scan {
                    path: source.path().map(Path::to_path_buf).unwrap_or_else(|| walk_root.clone()),
                    source,
                })?;

                if entry.file_type().is_dir() {
                    continue;
                }
                paths.push(entry.into_path());
            }

            paths.sort();
            Ok(paths)
        })
        .await;

        match discovered {
            Ok(result) => result,
            Err(join_err) => Err(VolvError::Workspace {
                path: root,
                source: std::io::Error::new(std::io::ErrorKind::Other, join_err.to_string()),
            }),
        }
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_excluded(exclude: &HashSet<String>, name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|name| exclude.contains(name)).unwrap_or(false)
}
