use std::path::{Component, Path, PathBuf};

use crate::error::{VolvError, VolvResult};
use crate::models::{CommitRef, CommitReport, FileEntry};
use crate::operations::Workspace;
use crate::scanner::{ScannedFile, TreeScanner};
use crate::vcs::VersionControl;

/// 单个提交的处理器：检出 -> 扫描 -> 持久化
///
/// 持有工作区的可变借用，因此两个提交的检出和扫描不可能交错。
pub struct CommitReporter<'w, V> {
    workspace: &'w mut Workspace<V>,
    scanner: TreeScanner,
    report_dir: PathBuf,
}

impl<'w, V: VersionControl> CommitReporter<'w, V> {
    pub fn new(workspace: &'w mut Workspace<V>, scanner: TreeScanner, report_dir: PathBuf) -> Self {
        Self {
            workspace,
            scanner,
            report_dir,
        }
    }

    /// 处理一个提交，返回内存中的报告
    pub async fn report_one(&mut self, commit: &CommitRef) -> VolvResult<CommitReport> {
        tracing::debug!("检出提交 {} ({})", commit.short_hash(), commit.position);
        self.workspace.set_to(&commit.hash).await?;

        let scanned = self.scanner.scan(self.workspace.root()).await?;

        let root = self.workspace.root();
        let files = scanned
            .into_iter()
            .map(|file| to_file_entry(root, file))
            .collect::<VolvResult<Vec<_>>>()?;

        let report = CommitReport {
            commit: commit.clone(),
            files,
        };

        let artifact = self.persist(&report).await?;
        tracing::debug!(
            "提交 {} 共 {} 个文件，报告已写入 {}",
            commit.short_hash(),
            report.files.len(),
            artifact.display()
        );

        Ok(report)
    }

    /// 将报告写入 `<report_dir>/<hash>.json`
    ///
    /// 先写临时文件再重命名，失败时不会留下半截的报告。
    async fn persist(&self, report: &CommitReport) -> VolvResult<PathBuf> {
        let path = report_artifact_path(&self.report_dir, &report.commit.hash);
        let entries = report.persisted_entries();
        write_json_atomically(&path, &entries).await?;
        Ok(path)
    }
}

/// 某个提交的报告文件路径
pub fn report_artifact_path(report_dir: &Path, hash: &str) -> PathBuf {
    report_dir.join(format!("{}.json", hash))
}

/// 以格式化 JSON 写入文件（临时文件 + 重命名）
pub(crate) async fn write_json_atomically<T: serde::Serialize>(path: &Path, value: &T) -> VolvResult<()> {
    let mut content = serde_json::to_vec_pretty(value).map_err(|e| VolvError::Persist {
        path: path.to_path_buf(),
        source: std::io::Error::from(e),
    })?;
    content.push(b'\n');

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &content)
        .await
        .map_err(|source| VolvError::Persist {
            path: tmp_path.clone(),
            source,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| VolvError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

/// 将扫描结果转换为带相对路径的文件条目
fn to_file_entry(root: &Path, file: ScannedFile) -> VolvResult<FileEntry> {
    Ok(FileEntry {
        relative_path: relative_key(root, &file.path)?,
        absolute_path: file.path,
        size_bytes: file.size,
    })
}

/// 去掉工作区根目录前缀，并统一使用 `/` 分隔
///
/// 相对路径是汇总时的键，非 UTF-8 的文件名无法无损表示，直接报错。
pub fn relative_key(root: &Path, path: &Path) -> VolvResult<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| VolvError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersistedEntry;
    use crate::test_support::{commit_files, init_repository};
    use crate::vcs::Libgit2Vcs;
    use tempfile::tempdir;

    #[test]
    fn test_relative_key_strips_root() {
        let root = Path::new("/tmp/volv/repo");
        assert_eq!(relative_key(root, Path::new("/tmp/volv/repo/src/lib.rs")).unwrap(), "src/lib.rs");
        assert_eq!(relative_key(root, Path::new("/tmp/volv/repo/a.txt")).unwrap(), "a.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_key_rejects_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("/tmp/volv/repo");
        let path = root.join("src").join(OsStr::from_bytes(b"bad\xff.txt"));

        let err = relative_key(root, &path).unwrap_err();
        assert!(matches!(err, VolvError::NonUtf8Path { .. }));
        assert_eq!(err.stage(), "scan");
    }

    #[tokio::test]
    async fn test_report_one_scans_and_persists() {
        let temp_dir = tempdir().unwrap();
        let origin = temp_dir.path().join("origin");
        let repo = init_repository(&origin);
        let a = commit_files(&repo, &[("f.txt", Some("0123456789")), ("src/x.rs", Some("fn x(){}"))], "A");

        let mut workspace = Workspace::clone_into(
            Libgit2Vcs::new(),
            origin.to_str().unwrap(),
            temp_dir.path().join("ws"),
        )
        .await
        .unwrap();

        let report_dir = temp_dir.path().join("reports");
        std::fs::create_dir_all(&report_dir).unwrap();

        let commit = CommitRef::new(a.to_string(), 0);
        let report = {
            let mut reporter = CommitReporter::new(&mut workspace, TreeScanner::new(), report_dir.clone());
            reporter.report_one(&commit).await.unwrap()
        };

        let paths: Vec<_> = report.files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["f.txt", "src/x.rs"]);
        assert_eq!(report.files[0].size_bytes, 10);
        assert!(report.files[0].absolute_path.starts_with(workspace.root()));

        let artifact = report_artifact_path(&report_dir, &a.to_string());
        let persisted: Vec<PersistedEntry> =
            serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
        assert_eq!(persisted, report.persisted_entries());
        assert!(!artifact.with_extension("json.tmp").exists());

        workspace.discard().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_commit_produces_no_artifact() {
        let temp_dir = tempdir().unwrap();
        let origin = temp_dir.path().join("origin");
        let repo = init_repository(&origin);
        commit_files(&repo, &[("f.txt", Some("x"))], "A");

        let mut workspace = Workspace::clone_into(
            Libgit2Vcs::new(),
            origin.to_str().unwrap(),
            temp_dir.path().join("ws"),
        )
        .await
        .unwrap();

        let report_dir = temp_dir.path().join("reports");
        std::fs::create_dir_all(&report_dir).unwrap();

        let bogus = "0000000000000000000000000000000000000000";
        let mut reporter = CommitReporter::new(&mut workspace, TreeScanner::new(), report_dir.clone());
        let err = reporter.report_one(&CommitRef::new(bogus, 0)).await.unwrap_err();

        assert!(matches!(err, VolvError::Checkout { .. }));
        assert!(!report_artifact_path(&report_dir, bogus).exists());
    }

    #[tokio::test]
    async fn test_missing_report_dir_is_persist_error() {
        let temp_dir = tempdir().unwrap();
        let origin = temp_dir.path().join("origin");
        let repo = init_repository(&origin);
        let a = commit_files(&repo, &[("f.txt", Some("x"))], "A");

        let mut workspace = Workspace::clone_into(
            Libgit2Vcs::new(),
            origin.to_str().unwrap(),
            temp_dir.path().join("ws"),
        )
        .await
        .unwrap();

        let mut reporter = CommitReporter::new(
            &mut workspace,
            TreeScanner::new(),
            temp_dir.path().join("no-such-dir"),
        );
        let err = reporter.report_one(&CommitRef::new(a.to_string(), 0)).await.unwrap_err();
        assert_eq!(err.stage(), "persist");
    }
}
