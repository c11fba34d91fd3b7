use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::CommitReport;

/// 单个文件路径在整个历史中的大小记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    /// 相对路径
    pub relative_path: String,

    /// 第一次出现时的绝对路径（仅供参考）
    pub absolute_path: PathBuf,

    /// 提交哈希 -> 文件大小；缺少某个哈希表示该提交中不存在此文件
    pub sizes_by_commit: BTreeMap<String, u64>,
}

/// 整个运行的汇总结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// 按遍历顺序排列的提交哈希
    pub commits: Vec<String>,

    /// 相对路径 -> 汇总条目
    pub files: BTreeMap<String, AggregateEntry>,
}

impl Aggregate {
    pub fn get(&self, relative_path: &str) -> Option<&AggregateEntry> {
        self.files.get(relative_path)
    }

    /// 指定文件在指定提交时的大小，`None` 表示该提交中没有这个文件
    pub fn size_at(&self, relative_path: &str, commit_hash: &str) -> Option<u64> {
        self.files
            .get(relative_path)
            .and_then(|entry| entry.sizes_by_commit.get(commit_hash))
            .copied()
    }

    pub fn path_count(&self) -> usize {
        self.files.len()
    }
}

/// 单个提交的派生统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStats {
    pub hash: String,
    pub file_count: usize,
    pub total_size: u64,
}

/// 运行结束时输出的摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    /// 每个提交的统计，按遍历顺序
    pub per_commit: Vec<CommitStats>,

    /// 出现过的不同路径数量
    pub distinct_paths: usize,

    /// 最后一个提交中最大的文件
    pub largest_final_file: Option<(String, u64)>,
}

impl HistorySummary {
    /// 从已捕获的报告计算统计信息
    ///
    /// 报告是不可变快照，与工作区无关，因此可以跨提交并行计算。
    pub fn from_reports(reports: &[CommitReport], aggregate: &Aggregate) -> Self {
        let per_commit = reports
            .par_iter()
            .map(|report| CommitStats {
                hash: report.commit.hash.clone(),
                file_count: report.files.len(),
                total_size: report.total_size(),
            })
            .collect();

        let largest_final_file = reports.last().and_then(|report| {
            report
                .files
                .par_iter()
                .max_by(|a, b| {
                    a.size_bytes
                        .cmp(&b.size_bytes)
                        .then_with(|| b.relative_path.cmp(&a.relative_path))
                })
                .map(|f| (f.relative_path.clone(), f.size_bytes))
        });

        Self {
            per_commit,
            distinct_paths: aggregate.path_count(),
            largest_final_file,
        }
    }

    pub fn commit_count(&self) -> usize {
        self.per_commit.len()
    }

    /// 最后一个提交的总大小
    pub fn final_total_size(&self) -> u64 {
        self.per_commit.last().map(|s| s.total_size).unwrap_or(0)
    }
}
