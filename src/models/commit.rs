use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 一个待访问的提交：哈希 + 在遍历顺序中的位置（从 0 开始，最旧的提交在前）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitRef {
    /// 完整的提交哈希
    pub hash: String,

    /// 在遍历顺序中的位置
    pub position: usize,
}

impl CommitRef {
    pub fn new(hash: impl Into<String>, position: usize) -> Self {
        Self {
            hash: hash.into(),
            position,
        }
    }

    /// 用于日志显示的短哈希
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(8);
        &self.hash[..end]
    }
}

/// 某个提交中单个文件的快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// 相对于工作区根目录的路径（使用 `/` 分隔，跨提交的关联键）
    pub relative_path: String,

    /// 扫描时的绝对路径
    pub absolute_path: PathBuf,

    /// 文件大小（字节）
    pub size_bytes: u64,
}

/// 单个提交的扫描结果
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub commit: CommitRef,

    /// 按相对路径字典序排列的文件列表
    pub files: Vec<FileEntry>,
}

/// 持久化到 `<hash>.json` 中的单条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub path: String,
    pub size: u64,
}

impl CommitReport {
    /// 该提交中所有文件的总大小
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// 转换为报告文件中的记录列表
    pub fn persisted_entries(&self) -> Vec<PersistedEntry> {
        self.files
            .iter()
            .map(|f| PersistedEntry {
                path: f.relative_path.clone(),
                size: f.size_bytes,
            })
            .collect()
    }
}
