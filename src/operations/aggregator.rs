use crate::models::{Aggregate, AggregateEntry, CommitReport};

/// 历史汇总器 - 把逐个提交的报告折叠成 路径 -> 各提交大小 的映射
#[derive(Debug, Default)]
pub struct HistoryAggregator {
    aggregate: Aggregate,
}

impl HistoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一个提交的报告，每个 (路径, 提交) 只写入一次
    pub fn fold(&mut self, report: &CommitReport) {
        let hash = &report.commit.hash;
        self.aggregate.commits.push(hash.clone());

        for file in &report.files {
            match self.aggregate.files.get_mut(&file.relative_path) {
                Some(entry) => {
                    entry.sizes_by_commit.insert(hash.clone(), file.size_bytes);
                }
                None => {
                    let mut entry = AggregateEntry {
                        relative_path: file.relative_path.clone(),
                        absolute_path: file.absolute_path.clone(),
                        sizes_by_commit: Default::default(),
                    };
                    entry.sizes_by_commit.insert(hash.clone(), file.size_bytes);
                    self.aggregate.files.insert(file.relative_path.clone(), entry);
                }
            }
        }
    }

    pub fn finish(self) -> Aggregate {
        self.aggregate
    }
}

/// 按遍历顺序折叠所有报告
pub fn aggregate(reports: &[CommitReport]) -> Aggregate {
    let mut aggregator = HistoryAggregator::new();
    for report in reports {
        aggregator.fold(report);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommitRef, FileEntry};
    use std::path::PathBuf;

    fn report(hash: &str, position: usize, files: &[(&str, u64)]) -> CommitReport {
        CommitReport {
            commit: CommitRef::new(hash, position),
            files: files
                .iter()
                .map(|(path, size)| FileEntry {
                    relative_path: path.to_string(),
                    absolute_path: PathBuf::from("/ws").join(path),
                    size_bytes: *size,
                })
                .collect(),
        }
    }

    fn three_commit_history() -> Vec<CommitReport> {
        vec![
            report("A", 0, &[("f.txt", 10)]),
            report("B", 1, &[("f.txt", 10), ("g.txt", 5)]),
            report("C", 2, &[("g.txt", 7)]),
        ]
    }

    #[test]
    fn test_three_commit_scenario() {
        let aggregate = aggregate(&three_commit_history());

        assert_eq!(aggregate.path_count(), 2);
        assert_eq!(aggregate.commits, vec!["A", "B", "C"]);

        let f = aggregate.get("f.txt").unwrap();
        assert_eq!(f.sizes_by_commit.len(), 2);
        assert_eq!(aggregate.size_at("f.txt", "A"), Some(10));
        assert_eq!(aggregate.size_at("f.txt", "B"), Some(10));
        assert_eq!(aggregate.size_at("f.txt", "C"), None);

        let g = aggregate.get("g.txt").unwrap();
        assert_eq!(g.sizes_by_commit.len(), 2);
        assert_eq!(aggregate.size_at("g.txt", "B"), Some(5));
        assert_eq!(aggregate.size_at("g.txt", "C"), Some(7));
        assert_eq!(g.absolute_path, PathBuf::from("/ws/g.txt"));
    }

    #[test]
    fn test_zero_size_is_distinct_from_absent() {
        let aggregate = aggregate(&[report("A", 0, &[("empty", 0)]), report("B", 1, &[])]);

        assert_eq!(aggregate.size_at("empty", "A"), Some(0));
        assert_eq!(aggregate.size_at("empty", "B"), None);
        assert_eq!(aggregate.commits.len(), 2);
    }

    #[test]
    fn test_key_count_matches_report_appearances() {
        let reports = three_commit_history();
        let aggregate = aggregate(&reports);

        for (path, entry) in &aggregate.files {
            let appearances = reports
                .iter()
                .filter(|r| r.files.iter().any(|f| &f.relative_path == path))
                .count();
            assert_eq!(entry.sizes_by_commit.len(), appearances);
        }
    }

    #[test]
    fn test_fold_order_does_not_change_sizes() {
        let reports = three_commit_history();
        let forward = aggregate(&reports);

        let reversed: Vec<_> = reports.iter().rev().cloned().collect();
        let backward = aggregate(&reversed);

        assert_eq!(forward.files, backward.files);
    }

    #[test]
    fn test_serialized_shape() {
        let aggregate = aggregate(&[report("A", 0, &[("f.txt", 10)])]);
        let value = serde_json::to_value(&aggregate).unwrap();

        assert_eq!(value["commits"][0], "A");
        assert_eq!(value["files"]["f.txt"]["relativePath"], "f.txt");
        assert_eq!(value["files"]["f.txt"]["sizesByCommit"]["A"], 10);
    }
}
