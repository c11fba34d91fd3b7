use std::path::Path;
use std::process::Output;
use tokio::process::Command;

use crate::error::{VolvError, VolvResult};
use crate::vcs::VersionControl;

/// 通过 `git` 命令行实现的版本控制后端
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// 在 `workdir` 中执行 git 子命令
    async fn run_in(&self, workdir: &Path, args: &[&str]) -> std::io::Result<Output> {
        Command::new(&self.binary)
            .arg("-C")
            .arg(workdir)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

/// 提取命令的错误输出，优先使用 stderr
fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }

    format!("git 退出状态: {}", output.status)
}

/// 以 `-` 开头的引用会被 git 当成选项解析
fn reject_option_like(reference: &str) -> Result<(), String> {
    if reference.starts_with('-') {
        return Err(format!("引用名不能以 '-' 开头: {}", reference));
    }
    Ok(())
}

impl VersionControl for GitCli {
    async fn ensure_available(&self) -> VolvResult<()> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| VolvError::Setup {
                message: format!("无法执行 `{}`，本程序需要安装 git: {}", self.binary, e),
            })?;

        if !output.status.success() {
            return Err(VolvError::Setup {
                message: format!("`{} --version` 执行失败: {}", self.binary, describe_failure(&output)),
            });
        }

        tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }

    async fn clone_repository(&self, remote: &str, dest: &Path) -> VolvResult<()> {
        let output = Command::new(&self.binary)
            .args(["clone", "--quiet", "--", remote])
            .arg(dest)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VolvError::Clone {
                remote: remote.to_string(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(VolvError::Clone {
                remote: remote.to_string(),
                output: describe_failure(&output),
            });
        }

        Ok(())
    }

    async fn checkout(&self, workdir: &Path, target: &str) -> VolvResult<()> {
        reject_option_like(target).map_err(|output| VolvError::Checkout {
            reference: target.to_string(),
            output,
        })?;

        // 结尾的 `--` 使 target 只能被解析为提交或分支，不会被当成要恢复的文件
        let output = self
            .run_in(
                workdir,
                &["-c", "advice.detachedHead=false", "checkout", "--quiet", "--force", target, "--"],
            )
            .await
            .map_err(|e| VolvError::Checkout {
                reference: target.to_string(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(VolvError::Checkout {
                reference: target.to_string(),
                output: describe_failure(&output),
            });
        }

        Ok(())
    }

    async fn list_commits(&self, workdir: &Path, branch: &str) -> VolvResult<Vec<String>> {
        reject_option_like(branch).map_err(|output| VolvError::Enumeration {
            branch: branch.to_string(),
            output,
        })?;

        let output = self
            .run_in(workdir, &["rev-list", "--reverse", "--topo-order", branch, "--"])
            .await
            .map_err(|e| VolvError::Enumeration {
                branch: branch.to_string(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(VolvError::Enumeration {
                branch: branch.to_string(),
                output: describe_failure(&output),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn current_branch(&self, workdir: &Path) -> VolvResult<Option<String>> {
        let output = self
            .run_in(workdir, &["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await
            .map_err(|e| VolvError::Setup {
                message: format!("无法读取当前分支: {}", e),
            })?;

        // 分离 HEAD 时 symbolic-ref 以非零状态退出
        if !output.status.success() {
            return Ok(None);
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if name.is_empty() { None } else { Some(name) })
    }

    async fn has_commits(&self, workdir: &Path) -> VolvResult<bool> {
        let output = self
            .run_in(workdir, &["for-each-ref", "--count=1", "--format=%(objectname)"])
            .await
            .map_err(|source| VolvError::Workspace {
                path: workdir.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(VolvError::Workspace {
                path: workdir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, describe_failure(&output)),
            });
        }

        // 空仓库克隆后没有任何引用
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }
}
