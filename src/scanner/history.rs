use std::collections::HashSet;

use crate::error::{VolvError, VolvResult};
use crate::models::CommitRef;
use crate::operations::Workspace;
use crate::vcs::VersionControl;

/// 历史枚举器 - 按从旧到新的顺序给出需要访问的提交
pub struct HistoryEnumerator;

impl HistoryEnumerator {
    /// 列出从 `branch` 可达的所有提交
    pub async fn list<V: VersionControl>(workspace: &Workspace<V>, branch: &str) -> VolvResult<Vec<CommitRef>> {
        let hashes = workspace.vcs().list_commits(workspace.root(), branch).await?;
        Self::from_hashes(branch, hashes)
    }

    /// 将哈希列表转换为带位置的提交引用，去掉重复项
    ///
    /// 空列表返回 [`VolvError::EmptyHistory`]。
    pub fn from_hashes(branch: &str, hashes: Vec<String>) -> VolvResult<Vec<CommitRef>> {
        let mut seen = HashSet::new();
        let commits: Vec<CommitRef> = hashes
            .into_iter()
            .map(|hash| hash.trim().to_string())
            .filter(|hash| !hash.is_empty())
            .filter(|hash| seen.insert(hash.clone()))
            .enumerate()
            .map(|(position, hash)| CommitRef::new(hash, position))
            .collect();

        if commits.is_empty() {
            return Err(VolvError::EmptyHistory {
                branch: branch.to_string(),
            });
        }

        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_input_order() {
        let commits = HistoryEnumerator::from_hashes(
            "main",
            vec!["aaa".to_string(), "bbb".to_string(), "ccc".to_string()],
        )
        .unwrap();

        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0], CommitRef::new("aaa", 0));
        assert_eq!(commits[2], CommitRef::new("ccc", 2));
    }

    #[test]
    fn test_duplicates_and_blank_lines_are_dropped() {
        let commits = HistoryEnumerator::from_hashes(
            "main",
            vec!["aaa".to_string(), "".to_string(), "bbb\n".to_string(), "aaa".to_string()],
        )
        .unwrap();

        let hashes: Vec<_> = commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["aaa", "bbb"]);
        assert_eq!(commits[1].position, 1);
    }

    #[test]
    fn test_empty_history_is_an_error() {
        let err = HistoryEnumerator::from_hashes("main", vec![]).unwrap_err();
        match err {
            VolvError::EmptyHistory { branch } => assert_eq!(branch, "main"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
